/// A representative subset of the CSS named-color keywords, enough to
/// exercise the serializer's shortest-representation rule (§4.6). Not the
/// full 148-entry table; extending it is a matter of appending rows.
pub const NAMED_COLORS: &[(&str, u8, u8, u8)] = &[
    ("black", 0, 0, 0),
    ("white", 255, 255, 255),
    ("red", 255, 0, 0),
    ("green", 0, 128, 0),
    ("lime", 0, 255, 0),
    ("blue", 0, 0, 255),
    ("yellow", 255, 255, 0),
    ("cyan", 0, 255, 255),
    ("aqua", 0, 255, 255),
    ("magenta", 255, 0, 255),
    ("fuchsia", 255, 0, 255),
    ("gray", 128, 128, 128),
    ("grey", 128, 128, 128),
    ("silver", 192, 192, 192),
    ("maroon", 128, 0, 0),
    ("olive", 128, 128, 0),
    ("navy", 0, 0, 128),
    ("purple", 128, 0, 128),
    ("teal", 0, 128, 128),
    ("orange", 255, 165, 0),
    ("pink", 255, 192, 203),
    ("brown", 165, 42, 42),
    ("gold", 255, 215, 0),
    ("indigo", 75, 0, 130),
    ("coral", 255, 127, 80),
    ("salmon", 250, 128, 114),
    ("khaki", 240, 230, 140),
    ("orchid", 218, 112, 214),
    ("plum", 221, 160, 221),
    ("tan", 210, 180, 140),
    ("transparent", 0, 0, 0),
    ("rebeccapurple", 102, 51, 153),
];

pub fn name_for_rgb(r: u8, g: u8, b: u8) -> Option<&'static str> {
    NAMED_COLORS
        .iter()
        .find(|(name, nr, ng, nb)| *name != "transparent" && *nr == r && *ng == g && *nb == b)
        .map(|(name, ..)| *name)
}
