//! Shell line parsing.

use std::path::PathBuf;

use ideaforge::documents::DocumentKind;
use ideaforge::shell::{ShellCommand, ShellParseError};

fn parse(line: &str) -> Result<ShellCommand, ShellParseError> {
    line.parse()
}

#[test]
fn idea_keeps_the_rest_of_the_line() {
    assert_eq!(
        parse("idea   Mobile   dog grooming  "),
        Ok(ShellCommand::Idea("Mobile   dog grooming".to_owned()))
    );
}

#[test]
fn refine_splits_kind_from_request() {
    assert_eq!(
        parse("refine market-research Focus on Europe only"),
        Ok(ShellCommand::Refine {
            kind: DocumentKind::MarketResearch,
            request: "Focus on Europe only".to_owned(),
        })
    );
}

#[test]
fn edit_takes_kind_and_path() {
    assert_eq!(
        parse("edit roadmap notes/roadmap.txt"),
        Ok(ShellCommand::Edit {
            kind: DocumentKind::Roadmap,
            path: PathBuf::from("notes/roadmap.txt"),
        })
    );
}

#[test]
fn optional_kinds_and_aliases() {
    assert_eq!(parse("show"), Ok(ShellCommand::Show(None)));
    assert_eq!(
        parse("SHOW technical-prd"),
        Ok(ShellCommand::Show(Some(DocumentKind::TechnicalPrd)))
    );
    assert_eq!(parse("save"), Ok(ShellCommand::Download(None)));
    assert_eq!(parse("ls"), Ok(ShellCommand::List));
    assert_eq!(parse("exit"), Ok(ShellCommand::Quit));
    assert_eq!(parse("?"), Ok(ShellCommand::Help));
}

#[test]
fn missing_arguments_are_reported() {
    assert!(matches!(
        parse("refine proposal"),
        Err(ShellParseError::MissingArgument {
            command: "refine",
            ..
        })
    ));
    assert!(matches!(
        parse("idea"),
        Err(ShellParseError::MissingArgument { command: "idea", .. })
    ));
    assert!(matches!(
        parse("select"),
        Err(ShellParseError::MissingArgument {
            command: "select",
            ..
        })
    ));
}

#[test]
fn bad_input_is_rejected() {
    assert_eq!(parse("   "), Err(ShellParseError::Empty));
    assert_eq!(
        parse("frobnicate now"),
        Err(ShellParseError::Unknown("frobnicate".to_owned()))
    );
    assert!(matches!(
        parse("select sales-deck"),
        Err(ShellParseError::Kind(_))
    ));
}
