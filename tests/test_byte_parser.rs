use phyloread::parser::byte_parser::ConsumeMode::{Exclusive, Inclusive};
use phyloread::parser::{ByteParser, ConsumeMode, ParsingErrorType};
use std::io::Write;

#[test]
fn test_skip_whitespace() {
    let mut parser = ByteParser::for_str(" \r  \t\n \t x y");
    parser.skip_whitespace();
    assert_eq!(parser.peek(), Some(b'x'));

    parser.next_byte(); // skip x
    parser.skip_whitespace();
    assert_eq!(parser.peek(), Some(b'y'));
}

#[test]
fn test_skip_comment() {
    let mut parser = ByteParser::for_str("Tree tiny = [Following tree is tiny] ((A:1,B:1):1,C:2)");
    parser.consume_until(b'=', ConsumeMode::Inclusive);
    parser.skip_whitespace();
    assert!(parser.skip_comment().unwrap());
    assert_eq!(parser.next_byte(), Some(b' '));
    assert_eq!(parser.next_byte(), Some(b'('));
    assert!(!parser.skip_comment().unwrap());
}

#[test]
fn test_parse_nested_comment() {
    let mut parser = ByteParser::for_str("[outer [inner] rest]x");
    assert_eq!(parser.parse_comment().unwrap().as_deref(), Some("outer [inner] rest"));
    assert_eq!(parser.peek(), Some(b'x'));
}

#[test]
fn test_unclosed_comment_reports_start() {
    let mut parser = ByteParser::for_str("(A,B) [never closed");
    parser.consume_until(b'[', Exclusive);
    let err = parser.skip_comment().unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::UnclosedComment);
    assert_eq!(err.position(), 6);
}

#[test]
fn test_skip_comment_and_whitespace() {
    let mut parser =
        ByteParser::for_str("[Go] \n[Keep going]   \t ['...']\n[One more to go]  END!");
    parser
        .skip_comment_and_whitespace()
        .expect("Failed to skip comments.");
    assert_eq!(parser.next_byte(), Some(b'E'));
}

#[test]
fn test_collect_comments_and_whitespace() {
    let mut parser = ByteParser::for_str(" [a]\n[&b=1] (");
    let mut comments = vec!["earlier".to_string()];
    parser.collect_comments_and_whitespace(&mut comments).unwrap();
    assert_eq!(comments, ["earlier", "a", "&b=1"]);
    assert_eq!(parser.peek(), Some(b'('));
}

#[test]
fn test_consume_until_inclusive() {
    let mut parser = ByteParser::for_str("consume a CAN of beans");
    parser.consume_until(b'C', Inclusive);
    assert_eq!(parser.peek(), Some(b'A'));
    assert_eq!(parser.position(), 11);
}

#[test]
fn test_consume_until_exclusive() {
    let mut parser = ByteParser::for_str("consume a CAN of beans");
    parser.consume_until(b'C', Exclusive);
    assert_eq!(parser.peek(), Some(b'C'));
    assert_eq!(parser.position(), 10);
}

#[test]
fn test_is_eof() {
    let mut parser = ByteParser::for_str("... happily ever after!");
    parser.consume_until(b'!', Inclusive);
    assert!(parser.is_eof());
}

#[test]
fn test_position() {
    let mut parser = ByteParser::for_str("Where are we?");
    assert_eq!(parser.position(), 0);
    parser.peek();
    assert_eq!(parser.position(), 0);
    parser.next_byte();
    assert_eq!(parser.position(), 1);
}

#[test]
fn test_peek_is_keyword() {
    let mut parser = ByteParser::for_str("BEGIN TREES;");
    assert!(parser.peek_is_keyword(b"BEGIN"));
    assert!(parser.peek_is_keyword(b"beGin"));
    assert!(!parser.peek_is_keyword(b"benin"));
    assert!(!parser.peek_is_keyword(b"BEG"));
    // Position should not have changed (peek operation)
    assert_eq!(parser.position(), 0);
    assert_eq!(parser.peek(), Some(b'B'));
}

#[test]
fn test_consume_if_keyword() {
    let mut parser = ByteParser::for_str("Endblock;");
    assert!(!parser.consume_if_keyword(b"END"));
    assert!(parser.consume_if_keyword(b"ENDBLOCK"));
    assert_eq!(parser.peek(), Some(b';'));
}

#[test]
fn test_skip_statement() {
    let mut parser = ByteParser::for_str("Title 'a;b' [c;d] x; Tree");
    parser.skip_statement().unwrap();
    parser.skip_whitespace();
    assert!(parser.peek_is_keyword(b"tree"));

    let mut parser = ByteParser::for_str("Title unterminated");
    let err = parser.skip_statement().unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::UnexpectedEof);
}

#[test]
fn test_parse_unquoted_label() {
    let mut parser = ByteParser::for_str("Scarabaeus:0.5");
    let delimiters = b"(),:; \t\n\r";
    let label = parser.parse_unquoted_label(delimiters).unwrap();
    assert_eq!(label, "Scarabaeus");
    assert_eq!(parser.peek(), Some(b':'));
}

#[test]
fn test_parse_quoted_label() {
    let mut parser = ByteParser::for_str("'Scarabaeus viettei':0.5");
    let label = parser.parse_quoted_label().unwrap();
    assert_eq!(label, "Scarabaeus viettei");
    assert_eq!(parser.peek(), Some(b':'));
}

#[test]
fn test_parse_quoted_label_with_escaped_quote() {
    let mut parser = ByteParser::for_str("'Wilson''s_storm-petrel',");
    let label = parser.parse_quoted_label().unwrap();
    assert_eq!(label, "Wilson's_storm-petrel");
    assert_eq!(parser.peek(), Some(b','));
}

#[test]
fn test_parse_label_chooses_quoted() {
    let mut parser = ByteParser::for_str("'Quoted label' ");
    let delimiters = b"(),:; \t\n\r";
    let label = parser.parse_label(delimiters).unwrap();
    assert_eq!(label, "Quoted label");
}

#[test]
fn test_parse_label_chooses_unquoted() {
    let mut parser = ByteParser::for_str("UnquotedLabel:");
    let delimiters = b"(),:; \t\n\r";
    let label = parser.parse_label(delimiters).unwrap();
    assert_eq!(label, "UnquotedLabel");
    assert_eq!(parser.peek(), Some(b':'));
}

#[test]
fn test_get_context() {
    let mut parser = ByteParser::for_str("Hello World!");
    assert_eq!(parser.get_context(5), b"Hello");

    parser.consume_if_keyword(b"Hello");
    parser.skip_whitespace();
    assert_eq!(parser.get_context(5), b"World");

    parser.consume_until(b'd', Inclusive);
    assert_eq!(parser.get_context(10), b"!");
}

#[test]
fn test_get_context_as_string() {
    let mut parser = ByteParser::for_str("BEGIN TREES;");
    assert_eq!(parser.get_context_as_string(5), "BEGIN");

    parser.consume_if_keyword(b"BEGIN");
    parser.skip_whitespace();
    assert_eq!(parser.get_context_as_string(10), "TREES;");
}

#[test]
fn test_buffered_parser_rewinds() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "#NEXUS\n[comment] BEGIN TREES;").unwrap();
    file.flush().unwrap();

    let mut parser = ByteParser::from_file_buffered(file.path()).unwrap();
    assert!(parser.consume_if_sequence(b"#NEXUS"));
    let start = parser.position();
    parser.skip_comment_and_whitespace().unwrap();
    assert!(parser.peek_is_keyword(b"begin"));

    parser.set_position(start);
    assert_eq!(parser.peek(), Some(b'\n'));
    assert_eq!(parser.read_remaining(), b"\n[comment] BEGIN TREES;");
    assert!(parser.is_eof());
}

#[test]
fn test_invalid_utf8_is_an_error() {
    let mut parser = ByteParser::from_bytes(b"K\xffa:1".to_vec());
    let err = parser.parse_unquoted_label(b":").unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::InvalidUtf8);
    assert_eq!(err.position(), 0);

    let mut parser = ByteParser::from_bytes(b"x 'K\xffa'".to_vec());
    parser.next_byte();
    parser.skip_whitespace();
    let err = parser.parse_quoted_label().unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::InvalidUtf8);
    assert_eq!(err.position(), 2);

    let mut parser = ByteParser::from_bytes(b"[note \xc3]".to_vec());
    let err = parser.parse_comment().unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::InvalidUtf8);
}
