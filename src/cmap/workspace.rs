use std::collections::HashMap;
use std::fs;
use std::path::Path;

use nom::{self, IResult, Parser};

use super::{CmapError, Palette};

type NomStrErr<'a> = nom::error::Error<&'a str>;

// color workspace files define named colors and named scales built from
// them; the format is documented at the bottom of the file

#[derive(Debug, Clone)]
pub struct Workspace {
    colors: HashMap<String, [f64; 3]>,
    maps: Vec<ScaleDef>,
}

#[derive(Debug, Clone)]
struct ScaleDef {
    name: String,
    colors: Vec<[f64; 3]>,
    positions: Vec<f64>,
}

impl Workspace {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CmapError> {
        let text = fs::read_to_string(&path)
            .map_err(|_| CmapError::SourceNotFound(path.as_ref().display().to_string()))?;

        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, CmapError> {
        // strip comment and blank lines ahead of the section parsers
        let clean: String = text
            .lines()
            .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
            .fold(String::new(), |mut s, x| {
                s.push_str(x);
                s.push('\n');
                s
            });
        let input = clean.as_str();

        let (input, color_defs) = section_parse("Colors", counted_lines(color_line))(input)
            .map_err(|_| CmapError::BadSource("bad $Colors section".to_string()))?;

        let mut colors = HashMap::new();
        for (name, rgb) in color_defs {
            if colors.insert(name.clone(), rgb).is_some() {
                return Err(CmapError::BadSource(format!("duplicate color {}", name)));
            }
        }

        let (_input, scale_defs) = section_parse("Maps", counted_lines(map_line))(input)
            .map_err(|_| CmapError::BadSource("bad $Maps section".to_string()))?;

        let mut maps: Vec<ScaleDef> = Vec::new();
        for (name, color_names, positions) in scale_defs {
            if maps.iter().any(|m| m.name == name) {
                return Err(CmapError::BadSource(format!("duplicate scale {}", name)));
            }
            if color_names.is_empty() {
                return Err(CmapError::BadSource(format!("scale {} has no colors", name)));
            }
            if color_names.len() != positions.len() {
                return Err(CmapError::BadSource(format!(
                    "scale {}: {} colors against {} positions",
                    name,
                    color_names.len(),
                    positions.len()
                )));
            }

            let mut resolved = Vec::new();
            for cn in &color_names {
                let rgb = colors.get(cn).ok_or_else(|| {
                    CmapError::BadSource(format!("scale {} references undefined color {}", name, cn))
                })?;
                resolved.push(*rgb);
            }

            maps.push(ScaleDef {
                name,
                colors: resolved,
                positions,
            });
        }

        Ok(Workspace { colors, maps })
    }

    pub fn find_map(&self, name: &str) -> Option<Palette> {
        self.maps.iter().find(|m| m.name == name).map(|m| {
            let points = m
                .positions
                .iter()
                .cloned()
                .zip(m.colors.iter().cloned())
                .collect();
            Palette::new(m.name.as_str(), points)
        })
    }

    pub fn color(&self, name: &str) -> Option<[f64; 3]> {
        self.colors.get(name).copied()
    }
}

fn counted_lines<'a, O, F>(mut f: F) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<O>>
where
    F: Parser<&'a str, O, NomStrErr<'a>>,
{
    // helper for sequences of lines of the form
    // count <n>\n<entry>\n<entry>\n...
    use nom::{bytes::complete::tag, character, error::ErrorKind, sequence::delimited};

    move |init_input| {
        let mut items = Vec::new();
        let (mut input, total_exp) =
            delimited(tag("count "), character::complete::u64, tag("\n"))(init_input)?;
        let total_exp = total_exp as usize;

        // need any returned errors to contain the initial slice
        let error = nom::Err::Error(nom::error::Error::new(init_input, ErrorKind::Verify));

        for _ in 0..total_exp {
            let (rem, value) = f.parse(input).map_err(|_| {
                nom::Err::Error(nom::error::Error::new(init_input, ErrorKind::Verify))
            })?;
            input = rem;
            items.push(value);

            let (rem, _) = tag("\n")(input).map_err(|_: nom::Err<NomStrErr<'a>>| {
                nom::Err::Error(nom::error::Error::new(init_input, ErrorKind::Verify))
            })?;
            input = rem;
        }

        if items.len() == total_exp {
            Ok((input, items))
        } else {
            Err(error)
        }
    }
}

fn section_parse<'a, O, F>(
    sec_name: &'static str,
    f: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: Parser<&'a str, O, NomStrErr<'a>>,
{
    // helper for the workspace section delimiters
    use nom::{bytes::complete::tag, sequence::delimited};

    delimited(
        delimited(tag("$"), tag(sec_name), tag("\n")),
        f,
        delimited(tag("$End"), tag(sec_name), tag("\n")),
    )
}

fn color_line(input: &str) -> IResult<&str, (String, [f64; 3])> {
    use nom::bytes::complete::tag;
    use nom::character::complete::alphanumeric1;
    use nom::combinator::map_opt;
    use nom::multi::separated_list0;
    use nom::number::complete::double;
    use nom::sequence::tuple;

    map_opt(
        tuple((
            alphanumeric1,
            tag(" "),
            alphanumeric1,
            tag(" "),
            separated_list0(tag("/"), double),
        )),
        |(name, _, space, _, vals): (&str, _, &str, _, Vec<f64>)| {
            convert_components(space, &vals).map(|rgb| (name.to_string(), rgb))
        },
    )(input)
}

fn map_line(input: &str) -> IResult<&str, (String, Vec<String>, Vec<f64>)> {
    use nom::bytes::complete::tag;
    use nom::character::complete::alphanumeric1;
    use nom::combinator::map;
    use nom::multi::separated_list0;
    use nom::number::complete::double;
    use nom::sequence::tuple;

    map(
        tuple((
            alphanumeric1,
            tag(" "),
            separated_list0(tag("/"), alphanumeric1),
            tag(" "),
            separated_list0(tag("/"), double),
        )),
        |(name, _, cols, _, pos): (&str, _, Vec<&str>, _, Vec<f64>)| {
            (
                name.to_string(),
                cols.iter().map(|c| c.to_string()).collect(),
                pos,
            )
        },
    )(input)
}

fn convert_components(space: &str, vals: &[f64]) -> Option<[f64; 3]> {
    if vals.len() != 3 {
        return None;
    }

    match space {
        "rgb" => Some([clamp01(vals[0]), clamp01(vals[1]), clamp01(vals[2])]),
        "rgb8" => Some([
            clamp01(vals[0] / 255.0),
            clamp01(vals[1] / 255.0),
            clamp01(vals[2] / 255.0),
        ]),
        "hsv" => Some(hsv_to_rgb(vals[0], vals[1], vals[2])),
        _ => None,
    }
}

fn clamp01(v: f64) -> f64 {
    v.min(1.0).max(0.0)
}

// hue in degrees, saturation and value in [0, 1]
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [f64; 3] {
    let h = h.rem_euclid(360.0);
    let s = clamp01(s);
    let v = clamp01(v);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    [r + m, g + m, b + m]
}

// Workspace file specification
// Anything in <> should be replaced (<> as well) with the specified contents
//
// ~~file begin~~
//
// # blank lines or those beginning with '#' are ignored
// $Colors
// count <ASCII uint, number of color definitions>
// <alphanumeric color name> <color space> <ASCII float c1>/<c2>/<c3>
// ...
// $EndColors
// $Maps
// count <ASCII uint, number of scale definitions>
// <alphanumeric scale name> <color name>/<color name>/... <ASCII float pos>/<pos>/...
// ...
// $EndMaps
// ~~file end~~
//
// Color spaces:
// rgb: three channels in [0, 1]
// rgb8: three channels in [0, 255], scaled down on load
// hsv: hue in degrees, saturation and value in [0, 1]
//
// A scale must reference only colors defined in $Colors and must carry
// exactly one position per color. Positions are conventionally ascending
// from 0 to 1; queries outside the listed range take the end colors.
