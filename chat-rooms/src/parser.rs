use std::net::Ipv4Addr;

use nom::{
    bytes::complete::{tag, take_till1},
    character::complete::{digit1, multispace0, multispace1},
    combinator::{all_consuming, map_res},
    sequence::{delimited, terminated, tuple},
    IResult,
};

fn word(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(input)
}

fn ipv4(input: &str) -> IResult<&str, Ipv4Addr> {
    map_res(
        take_till1(|c: char| c.is_whitespace() || c == ','),
        |s: &str| s.parse::<Ipv4Addr>(),
    )(input)
}

fn port(input: &str) -> IResult<&str, u16> {
    map_res(digit1, |s: &str| s.parse::<u16>())(input)
}

/// `name ip port` with any amount of whitespace around and between them.
pub fn parse_room_args(input: &str) -> IResult<&str, (&str, Ipv4Addr, u16)> {
    all_consuming(delimited(
        multispace0,
        tuple((
            terminated(word, multispace1),
            terminated(ipv4, multispace1),
            port,
        )),
        multispace0,
    ))(input)
}

/// One GETDIR line without its newline: `name: (ip, port)`.
pub fn parse_listing_line(input: &str) -> IResult<&str, (&str, Ipv4Addr, u16)> {
    all_consuming(tuple((
        terminated(take_till1(|c: char| c == ':'), tag(": (")),
        terminated(ipv4, tag(", ")),
        terminated(port, tag(")")),
    )))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_args() {
        assert_eq!(
            parse_room_args("room1 239.1.1.1 4000"),
            Ok(("", ("room1", Ipv4Addr::new(239, 1, 1, 1), 4000)))
        );
        assert!(parse_room_args("room1 239.1.1.1 4000 extra").is_err());
        assert!(parse_room_args("room1 not-an-ip 4000").is_err());
        assert!(parse_room_args("").is_err());
    }

    #[test]
    fn listing_line() {
        assert_eq!(
            parse_listing_line("room1: (239.1.1.1, 4000)"),
            Ok(("", ("room1", Ipv4Addr::new(239, 1, 1, 1), 4000)))
        );
        assert!(parse_listing_line("room1 (239.1.1.1, 4000)").is_err());
        assert!(parse_listing_line("room1: (239.1.1.1, 4000) ").is_err());
    }
}
