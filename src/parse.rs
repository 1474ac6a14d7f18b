use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while, take_while1},
    character::complete::{char, line_ending, space0},
    combinator::{all_consuming, opt, value},
    error::{Error as NomError, ErrorKind},
    multi::{many0, separated_list0},
    sequence::{delimited, preceded},
    IResult,
};

use crate::error::{Error, ParseError, Result};
use crate::types::{Field, StatusKind, StatusResponse};

fn is_token_char(c: u8) -> bool {
    !matches!(
        c,
        b' ' | b'(' | b')' | b'[' | b']' | b'"' | b'{' | b'\r' | b'\n'
    ) && c > 0x1f
        && c != 0x7f
}

fn request_tag(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(|c| is_token_char(c) && c != b'+' && c != b'*')(i)
}

fn status_kind(i: &[u8]) -> IResult<&[u8], StatusKind> {
    alt((
        value(StatusKind::Ok, tag_no_case("OK")),
        value(StatusKind::No, tag_no_case("NO")),
        value(StatusKind::Bad, tag_no_case("BAD")),
    ))(i)
}

fn quoted(i: &[u8]) -> IResult<&[u8], Field> {
    let (mut rest, _) = char('"')(i)?;
    let mut out = Vec::new();
    loop {
        match rest.split_first() {
            Some((&b'"', r)) => {
                return Ok((r, Field::Quoted(String::from_utf8_lossy(&out).into_owned())));
            }
            Some((&b'\\', r)) => match r.split_first() {
                Some((&c, r)) if c != b'\r' && c != b'\n' => {
                    out.push(c);
                    rest = r;
                }
                _ => return Err(nom::Err::Error(NomError::new(rest, ErrorKind::Escaped))),
            },
            Some((&c, r)) if c != b'\r' && c != b'\n' => {
                out.push(c);
                rest = r;
            }
            _ => return Err(nom::Err::Error(NomError::new(rest, ErrorKind::Char))),
        }
    }
}

fn list(i: &[u8]) -> IResult<&[u8], Field> {
    let (i, fields) = delimited(char('('), separated_list0(char(' '), field), char(')'))(i)?;
    Ok((i, Field::List(fields)))
}

fn token(i: &[u8]) -> IResult<&[u8], Field> {
    let (i, raw) = take_while1(is_token_char)(i)?;
    let text = String::from_utf8_lossy(raw);
    let field = if text.eq_ignore_ascii_case("NIL") {
        Field::Nil
    } else if raw.iter().all(u8::is_ascii_digit) {
        match text.parse::<u32>() {
            Ok(n) => Field::Number(n),
            Err(_) => Field::Atom(text.into_owned()),
        }
    } else {
        Field::Atom(text.into_owned())
    };
    Ok((i, field))
}

fn field(i: &[u8]) -> IResult<&[u8], Field> {
    alt((quoted, list, token))(i)
}

// command arguments are typed by the command, so digits stay text here
fn atom(i: &[u8]) -> IResult<&[u8], Field> {
    let (i, raw) = take_while1(is_token_char)(i)?;
    let text = String::from_utf8_lossy(raw);
    let field = if text.eq_ignore_ascii_case("NIL") {
        Field::Nil
    } else {
        Field::Atom(text.into_owned())
    };
    Ok((i, field))
}

fn argument_list(i: &[u8]) -> IResult<&[u8], Field> {
    let (i, fields) = delimited(char('('), separated_list0(char(' '), argument), char(')'))(i)?;
    Ok((i, Field::List(fields)))
}

fn argument(i: &[u8]) -> IResult<&[u8], Field> {
    alt((quoted, argument_list, atom))(i)
}

// resp-text-code; arguments we cannot tokenize are kept as a single atom
fn response_code(i: &[u8]) -> IResult<&[u8], (String, Vec<Field>)> {
    let (i, _) = char('[')(i)?;
    let (i, code) = take_while1(is_token_char)(i)?;
    let (i, mut arguments) = many0(preceded(char(' '), field))(i)?;
    let (i, rest) = opt(preceded(
        char(' '),
        take_while1(|c| c != b']' && c != b'\r' && c != b'\n'),
    ))(i)?;
    let (i, _) = char(']')(i)?;
    if let Some(rest) = rest {
        arguments.push(Field::Atom(String::from_utf8_lossy(rest).into_owned()));
    }
    let code = String::from_utf8_lossy(code).to_ascii_uppercase();
    Ok((i, (code, arguments)))
}

fn status_line(i: &[u8]) -> IResult<&[u8], StatusResponse> {
    let (i, tag) = request_tag(i)?;
    let (i, _) = char(' ')(i)?;
    let (i, kind) = status_kind(i)?;
    let (i, code) = opt(preceded(char(' '), response_code))(i)?;
    let (i, _) = space0(i)?;
    let (i, text) = take_while(|c| c != b'\r' && c != b'\n')(i)?;
    let (i, _) = line_ending(i)?;

    let mut status = StatusResponse::new(String::from_utf8_lossy(tag), kind);
    if let Some((code, arguments)) = code {
        status = status.with_code(code, arguments);
    }
    if !text.is_empty() {
        status = status.with_information(String::from_utf8_lossy(text));
    }
    Ok((i, status))
}

/// Check whether `line` is the tagged response for `tag`.
pub(crate) fn is_tagged(line: &[u8], tag: &str) -> bool {
    line.len() > tag.len() && line.starts_with(tag.as_bytes()) && line[tag.len()] == b' '
}

/// Parse a complete tagged status line, including its trailing CRLF.
pub(crate) fn parse_status_line(line: &[u8]) -> Result<StatusResponse> {
    match all_consuming(status_line)(line) {
        Ok((_, status)) => Ok(status),
        Err(_) => Err(Error::Parse(ParseError::Invalid(line.to_vec()))),
    }
}

/// Parse the space-separated arguments that follow a command keyword.
///
/// Unlike response-code arguments, all-digit tokens are kept as [`Field::Atom`]s, since only
/// the command knows whether `5` is a number or a one-element sequence set.
pub(crate) fn parse_fields(input: &str) -> Result<Vec<Field>> {
    match all_consuming(separated_list0(char(' '), argument))(input.as_bytes()) {
        Ok((_, fields)) => Ok(fields),
        Err(_) => Err(Error::Parse(ParseError::Invalid(input.as_bytes().to_vec()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ok() {
        let status = parse_status_line(b"a1 OK Logged in.\r\n").unwrap();
        assert_eq!(status.tag, "a1");
        assert_eq!(status.kind, StatusKind::Ok);
        assert_eq!(status.code, None);
        assert!(status.arguments.is_empty());
        assert_eq!(status.information.as_deref(), Some("Logged in."));
    }

    #[test]
    fn no_text() {
        let status = parse_status_line(b"a7 no\r\n").unwrap();
        assert_eq!(status.kind, StatusKind::No);
        assert_eq!(status.information, None);
    }

    #[test]
    fn appenduid() {
        let status = parse_status_line(b"a2 OK [APPENDUID 38505 3955] APPEND completed\r\n").unwrap();
        assert_eq!(status.code.as_deref(), Some("APPENDUID"));
        assert_eq!(
            status.arguments,
            vec![Field::Number(38505), Field::Number(3955)]
        );
        assert_eq!(status.information.as_deref(), Some("APPEND completed"));
    }

    #[test]
    fn copyuid() {
        let status =
            parse_status_line(b"a3 OK [copyuid 38505 304,319:320 3956:3958] Done\r\n").unwrap();
        assert_eq!(status.code.as_deref(), Some("COPYUID"));
        assert_eq!(
            status.arguments,
            vec![
                Field::Number(38505),
                Field::Atom("304,319:320".to_string()),
                Field::Atom("3956:3958".to_string()),
            ]
        );
    }

    #[test]
    fn code_without_arguments() {
        let status = parse_status_line(b"a4 OK [UIDNOTSTICKY] Non-persistent UIDs\r\n").unwrap();
        assert_eq!(status.code.as_deref(), Some("UIDNOTSTICKY"));
        assert!(status.arguments.is_empty());
    }

    #[test]
    fn code_with_list_and_quoted() {
        let status =
            parse_status_line(b"a5 NO [BADCHARSET (UTF-8 \"US ASCII\")] unsupported\n").unwrap();
        assert_eq!(status.kind, StatusKind::No);
        assert_eq!(
            status.arguments,
            vec![Field::List(vec![
                Field::Atom("UTF-8".to_string()),
                Field::Quoted("US ASCII".to_string()),
            ])]
        );
    }

    #[test]
    fn untokenizable_code_arguments() {
        let status = parse_status_line(b"a6 NO [XWEIRD a \"b] text\r\n").unwrap();
        assert_eq!(status.code.as_deref(), Some("XWEIRD"));
        assert_eq!(
            status.arguments,
            vec![
                Field::Atom("a".to_string()),
                Field::Atom("\"b".to_string())
            ]
        );
    }

    #[test]
    fn malformed() {
        for line in [
            &b"* OK untagged\r\n"[..],
            b"a1 MAYBE done\r\n",
            b"a1 OK done",
        ] {
            match parse_status_line(line) {
                Err(Error::Parse(ParseError::Invalid(v))) => assert_eq!(v, line),
                other => panic!("{:?} parsed as {:?}", line, other),
            }
        }
    }

    #[test]
    fn unterminated_code_is_text() {
        let status = parse_status_line(b"a1 OK [APPENDUID 1 2 done\r\n").unwrap();
        assert_eq!(status.code, None);
        assert_eq!(
            status.information.as_deref(),
            Some("[APPENDUID 1 2 done")
        );
    }

    #[test]
    fn tagged() {
        assert!(is_tagged(b"a1 OK done\r\n", "a1"));
        assert!(!is_tagged(b"a10 OK done\r\n", "a1"));
        assert!(!is_tagged(b"* 1 EXPUNGE\r\n", "a1"));
    }

    #[test]
    fn fields() {
        assert_eq!(
            parse_fields("1:3 123 NIL").unwrap(),
            vec![
                Field::Atom("1:3".to_string()),
                Field::Atom("123".to_string()),
                Field::Nil
            ]
        );
        assert_eq!(
            parse_fields("(5 \"x\")").unwrap(),
            vec![Field::List(vec![
                Field::Atom("5".to_string()),
                Field::Quoted("x".to_string())
            ])]
        );
        assert_eq!(parse_fields("").unwrap(), vec![]);
    }
}
