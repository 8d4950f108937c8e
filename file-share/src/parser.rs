use nom::{bytes::complete::take, combinator::rest, IResult};

use crate::message::FILENAME_FIELD_LEN;

/// GET payload: exactly one file name field.
pub fn parse_filename_field(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take(FILENAME_FIELD_LEN)(input)
}

/// PUT payload: the file name field, then the file contents up to the end of the frame.
pub fn parse_put(input: &[u8]) -> IResult<&[u8], (&[u8], &[u8])> {
    let (input, field) = parse_filename_field(input)?;

    let (input, contents) = rest(input)?;

    Ok((input, (field, contents)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_splits_name_from_contents() {
        let mut payload = vec![b'a'; FILENAME_FIELD_LEN];
        payload.extend_from_slice(b"hello");

        let (rest, (field, contents)) = parse_put(&payload).unwrap();
        assert!(rest.is_empty());
        assert_eq!(field.len(), FILENAME_FIELD_LEN);
        assert_eq!(contents, b"hello");
    }

    #[test]
    fn short_field_is_an_error() {
        assert!(parse_filename_field(b"short").is_err());
    }
}
