//! Parsing of shell input lines. Row and entry numbers are 1-based on the
//! command line and 0-based in messages.

use std::path::PathBuf;

use mediadeck_core::{AdminView, JobKind, ListKind, Msg};

pub const HELP: &str = "\
commands:
  open <media|movies|series>     open a list view
  search <query>                 search the library
  more <list>                    load the next page of a list
  close <list>                   close a list view
  admin <playlists|providers>    open an admin table
  leave <playlists|providers>    close an admin table
  select <table> <row>           toggle a table row
  upload <file>...               upload playlist files
  load                           load the selected playlists
  delete                         delete the selected providers
  watch <list> <row>             add a list item to the watch list
  unwatch <entry>                remove a watch list entry
  clear                          empty the watch list
  submit                         send the watch list
  dismiss                        hide the current notice
  help                           show this text
  quit                           exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(Msg),
    Upload(Vec<PathBuf>),
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let msg = match verb.to_ascii_lowercase().as_str() {
        "" | "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "open" => {
            let list = list_arg(&args, 0)?;
            if list == ListKind::Search {
                return Err("use `search <query>` to open search results".to_string());
            }
            Msg::ListOpened { list, query: None }
        }
        "search" => Msg::ListOpened {
            list: ListKind::Search,
            query: Some(rest.to_string()),
        },
        "more" => Msg::LoadMoreRequested(list_arg(&args, 0)?),
        "close" => Msg::ListClosed(list_arg(&args, 0)?),
        "admin" => Msg::AdminOpened(table_arg(&args, 0)?),
        "leave" => Msg::AdminClosed(table_arg(&args, 0)?),
        "select" => Msg::RowToggled {
            view: table_arg(&args, 0)?,
            index: number_arg(&args, 1, "row")?,
        },
        "upload" => {
            if args.is_empty() {
                return Err("upload needs at least one file".to_string());
            }
            return Ok(Command::Upload(args.iter().map(PathBuf::from).collect()));
        }
        "load" => Msg::JobRequested(JobKind::Load),
        "delete" => Msg::JobRequested(JobKind::Delete),
        "watch" => Msg::WatchListAddFromList {
            list: list_arg(&args, 0)?,
            index: number_arg(&args, 1, "row")?,
        },
        "unwatch" => Msg::WatchListRemove(number_arg(&args, 0, "entry")?),
        "clear" => Msg::WatchListCleared,
        "submit" => Msg::WatchListSubmitRequested,
        "dismiss" => Msg::NoticeDismissed,
        other => return Err(format!("unknown command `{other}` (try `help`)")),
    };
    Ok(Command::Send(msg))
}

fn list_arg(args: &[&str], at: usize) -> Result<ListKind, String> {
    let name = args.get(at).ok_or("missing list name")?;
    ListKind::from_label(name).ok_or_else(|| format!("unknown list `{name}`"))
}

fn table_arg(args: &[&str], at: usize) -> Result<AdminView, String> {
    let name = args.get(at).ok_or("missing table name")?;
    AdminView::from_label(name).ok_or_else(|| format!("unknown table `{name}`"))
}

fn number_arg(args: &[&str], at: usize, what: &str) -> Result<usize, String> {
    let raw = args.get(at).ok_or_else(|| format!("missing {what} number"))?;
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("{what} must be a number starting at 1, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_commands() {
        assert_eq!(
            parse("open Movies"),
            Ok(Command::Send(Msg::ListOpened {
                list: ListKind::Movies,
                query: None
            }))
        );
        assert_eq!(
            parse("  more series "),
            Ok(Command::Send(Msg::LoadMoreRequested(ListKind::Series)))
        );
        assert!(parse("open search").is_err());
        assert!(parse("open cartoons").is_err());
    }

    #[test]
    fn search_keeps_the_whole_query() {
        assert_eq!(
            parse("search star  wars"),
            Ok(Command::Send(Msg::ListOpened {
                list: ListKind::Search,
                query: Some("star  wars".to_string())
            }))
        );
    }

    #[test]
    fn rows_are_one_based() {
        assert_eq!(
            parse("select providers 2"),
            Ok(Command::Send(Msg::RowToggled {
                view: AdminView::Providers,
                index: 1
            }))
        );
        assert_eq!(
            parse("watch media 1"),
            Ok(Command::Send(Msg::WatchListAddFromList {
                list: ListKind::Media,
                index: 0
            }))
        );
        assert!(parse("unwatch 0").is_err());
        assert!(parse("select playlists x").is_err());
    }

    #[test]
    fn upload_collects_paths() {
        assert_eq!(
            parse("upload a.m3u b.m3u8"),
            Ok(Command::Upload(vec![
                PathBuf::from("a.m3u"),
                PathBuf::from("b.m3u8")
            ]))
        );
        assert!(parse("upload").is_err());
    }

    #[test]
    fn misc_commands() {
        assert_eq!(parse(""), Ok(Command::Help));
        assert_eq!(parse("QUIT"), Ok(Command::Quit));
        assert_eq!(
            parse("delete"),
            Ok(Command::Send(Msg::JobRequested(JobKind::Delete)))
        );
        assert!(parse("frobnicate").unwrap_err().contains("frobnicate"));
    }
}
