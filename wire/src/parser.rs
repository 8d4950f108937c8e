use nom::{
    number::streaming::{be_u64, be_u8},
    IResult,
};

/// Envelope header: the tag byte followed by the payload length.
///
/// Both parsers are streaming, so a short buffer yields `Err::Incomplete`
/// rather than a failure.
pub(crate) fn parse_header(input: &[u8]) -> IResult<&[u8], (u8, u64)> {
    let (input, tag) = be_u8(input)?;

    let (input, length) = be_u64(input)?;

    Ok((input, (tag, length)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_needs_nine_bytes() {
        assert!(matches!(
            parse_header(&[2, 0, 0, 0]),
            Err(nom::Err::Incomplete(_))
        ));

        let (rest, header) = parse_header(&[2, 0, 0, 0, 0, 0, 0, 1, 4, b'x']).unwrap();
        assert_eq!(header, (2, 260));
        assert_eq!(rest, b"x");
    }
}
