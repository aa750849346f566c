/// CSS-style color strings for the terminal canvas
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while_m_n},
    character::complete::{char, multispace0, u8 as dec_u8},
    combinator::{all_consuming, map, map_res},
    sequence::{delimited, preceded, tuple},
    IResult,
};

/// An opaque 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend `over` on top of `self` with coverage `alpha` in 0..=255
    pub fn blend(self, over: Rgb, alpha: u8) -> Rgb {
        let a = alpha as u32;
        let mix = |under: u8, over: u8| ((over as u32 * a + under as u32 * (255 - a)) / 255) as u8;
        Rgb::new(mix(self.r, over.r), mix(self.g, over.g), mix(self.b, over.b))
    }
}

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("lime", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("aqua", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("fuchsia", Rgb::new(255, 0, 255)),
    ("orange", Rgb::new(255, 165, 0)),
    ("purple", Rgb::new(128, 0, 128)),
    ("pink", Rgb::new(255, 192, 203)),
    ("brown", Rgb::new(165, 42, 42)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("silver", Rgb::new(192, 192, 192)),
    ("navy", Rgb::new(0, 0, 128)),
    ("teal", Rgb::new(0, 128, 128)),
    ("olive", Rgb::new(128, 128, 0)),
    ("maroon", Rgb::new(128, 0, 0)),
    ("gold", Rgb::new(255, 215, 0)),
];

/// Parse a color: a CSS name, `#rgb`, `#rrggbb` or `rgb(r, g, b)`
pub fn parse_color(input: &str) -> Option<Rgb> {
    let input = input.trim();
    if let Some((_, color)) = NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(input))
    {
        return Some(*color);
    }

    all_consuming(alt((hex_long, hex_short, rgb_function)))(input)
        .ok()
        .map(|(_, color)| color)
}

fn hex_pair(input: &str) -> IResult<&str, &str> {
    take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit())(input)
}

fn hex_single(input: &str) -> IResult<&str, &str> {
    take_while_m_n(1, 1, |c: char| c.is_ascii_hexdigit())(input)
}

fn hex_channel(input: &str) -> IResult<&str, u8> {
    map_res(hex_pair, |digits| u8::from_str_radix(digits, 16))(input)
}

fn hex_nibble(input: &str) -> IResult<&str, u8> {
    map_res(hex_single, |digit| u8::from_str_radix(digit, 16).map(|v| v * 17))(input)
}

fn hex_long(input: &str) -> IResult<&str, Rgb> {
    map(
        preceded(tag("#"), tuple((hex_channel, hex_channel, hex_channel))),
        |(r, g, b)| Rgb::new(r, g, b),
    )(input)
}

fn hex_short(input: &str) -> IResult<&str, Rgb> {
    map(
        preceded(tag("#"), tuple((hex_nibble, hex_nibble, hex_nibble))),
        |(r, g, b)| Rgb::new(r, g, b),
    )(input)
}

fn channel(input: &str) -> IResult<&str, u8> {
    delimited(multispace0, dec_u8, multispace0)(input)
}

fn rgb_function(input: &str) -> IResult<&str, Rgb> {
    let (input, _) = tag_no_case("rgb")(input)?;
    let (input, _) = preceded(multispace0, char('('))(input)?;
    let (input, r) = channel(input)?;
    let (input, _) = char(',')(input)?;
    let (input, g) = channel(input)?;
    let (input, _) = char(',')(input)?;
    let (input, b) = channel(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, Rgb::new(r, g, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(parse_color("red"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_color(" Green "), Some(Rgb::new(0, 128, 0)));
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_color("#ff8800"), Some(Rgb::new(255, 136, 0)));
        assert_eq!(parse_color("#0f0"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#gg0000"), None);
    }

    #[test]
    fn test_rgb_function() {
        assert_eq!(parse_color("rgb(10, 20,30)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(parse_color("rgb(300, 0, 0)"), None);
        assert_eq!(parse_color("rgb(1, 2)"), None);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(parse_color("wood.png"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn test_blend() {
        let under = Rgb::new(0, 0, 0);
        assert_eq!(under.blend(Rgb::new(255, 255, 255), 255), Rgb::new(255, 255, 255));
        assert_eq!(under.blend(Rgb::new(255, 255, 255), 0), under);
    }
}
