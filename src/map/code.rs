//! The tile-code mini-language.
//!
//! Tiles are described by compact strings of `;`-joined segments:
//!
//! ```text
//! city=revenue:50,slots:2;path=a:0,b:_0;path=a:3,b:_0;label=DFW
//! offboard=revenue:yellow_20|green_30|brown_40|gray_50;path=a:2,b:_0
//! upgrade=cost:15,terrain:mountain;icon=image:18_usa/mine
//! ```
//!
//! Codes are parsed once per tile definition. Parsing then re-encoding
//! yields an equivalent connectivity graph: the canonical encoding may
//! differ textually (key order, omitted defaults) but re-parses to the same
//! part list.

use thiserror::Error;

use super::part::{Part, PathEnd, Revenue, Terrain, TileColor};

/// Errors from parsing a tile code string.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TileCodeError {
    /// Segment type is not part of the grammar.
    #[error("unknown segment {0:?}")]
    UnknownSegment(String),
    /// A required key is missing from a segment.
    #[error("segment {segment:?} missing key {key:?}")]
    MissingKey {
        /// Segment type.
        segment: &'static str,
        /// The missing key.
        key: &'static str,
    },
    /// A value failed to parse.
    #[error("bad value {value:?} for {key:?}")]
    BadValue {
        /// The key whose value was malformed.
        key: &'static str,
        /// The offending text.
        value: String,
    },
    /// A path endpoint was not an edge (`0`..`5`) or node (`_K`).
    #[error("bad path endpoint {0:?}")]
    BadEndpoint(String),
}

/// Parse a tile code string into its part list.
pub fn parse(code: &str) -> Result<Vec<Part>, TileCodeError> {
    let mut parts = Vec::new();

    for segment in code.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let (name, args) = match segment.split_once('=') {
            Some((name, args)) => (name, args),
            None => (segment, ""),
        };

        match name {
            "city" => {
                let revenue = parse_revenue(require(args, "city", "revenue")?)?;
                let slots = match lookup(args, "slots") {
                    Some(v) => u8::try_from(parse_int(v, "slots")?).map_err(|_| {
                        TileCodeError::BadValue {
                            key: "slots",
                            value: v.to_string(),
                        }
                    })?,
                    None => 1,
                };
                parts.push(Part::City { revenue, slots });
            }
            "town" => {
                let revenue = parse_revenue(require(args, "town", "revenue")?)?;
                parts.push(Part::Town { revenue });
            }
            "halt" => {
                let revenue = parse_int(require(args, "halt", "revenue")?, "revenue")?;
                parts.push(Part::Halt { revenue });
            }
            "offboard" => {
                let revenue = parse_revenue(require(args, "offboard", "revenue")?)?;
                parts.push(Part::Offboard { revenue });
            }
            "junction" => parts.push(Part::Junction),
            "path" => {
                let a = parse_endpoint(require(args, "path", "a")?)?;
                let b = parse_endpoint(require(args, "path", "b")?)?;
                parts.push(Part::Path { a, b });
            }
            "upgrade" => {
                let cost = parse_int(require(args, "upgrade", "cost")?, "cost")?;
                let terrain = match lookup(args, "terrain") {
                    Some(list) => list
                        .split('|')
                        .map(|t| {
                            Terrain::from_str(t).ok_or_else(|| TileCodeError::BadValue {
                                key: "terrain",
                                value: t.to_string(),
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    None => Vec::new(),
                };
                parts.push(Part::Upgrade { cost, terrain });
            }
            "label" => parts.push(Part::Label(args.to_string())),
            "icon" => {
                let image = require(args, "icon", "image")?;
                parts.push(Part::Icon {
                    image: image.to_string(),
                });
            }
            other => return Err(TileCodeError::UnknownSegment(other.to_string())),
        }
    }

    Ok(parts)
}

/// Encode a part list back to canonical tile-code form.
#[must_use]
pub fn encode(parts: &[Part]) -> String {
    let mut segments = Vec::with_capacity(parts.len());

    for part in parts {
        match part {
            Part::City { revenue, slots } => {
                let mut s = format!("city=revenue:{}", encode_revenue(revenue));
                if *slots != 1 {
                    s.push_str(&format!(",slots:{slots}"));
                }
                segments.push(s);
            }
            Part::Town { revenue } => {
                segments.push(format!("town=revenue:{}", encode_revenue(revenue)));
            }
            Part::Halt { revenue } => segments.push(format!("halt=revenue:{revenue}")),
            Part::Offboard { revenue } => {
                segments.push(format!("offboard=revenue:{}", encode_revenue(revenue)));
            }
            Part::Junction => segments.push("junction".to_string()),
            Part::Path { a, b } => {
                segments.push(format!("path=a:{},b:{}", encode_endpoint(*a), encode_endpoint(*b)));
            }
            Part::Label(label) => segments.push(format!("label={label}")),
            Part::Icon { image } => segments.push(format!("icon=image:{image}")),
            Part::Upgrade { cost, terrain } => {
                let mut s = format!("upgrade=cost:{cost}");
                if !terrain.is_empty() {
                    let list: Vec<_> = terrain.iter().map(|t| t.as_str()).collect();
                    s.push_str(&format!(",terrain:{}", list.join("|")));
                }
                segments.push(s);
            }
        }
    }

    segments.join(";")
}

fn lookup<'a>(args: &'a str, key: &str) -> Option<&'a str> {
    args.split(',').find_map(|pair| {
        let (k, v) = pair.split_once(':')?;
        (k == key).then_some(v)
    })
}

fn require<'a>(
    args: &'a str,
    segment: &'static str,
    key: &'static str,
) -> Result<&'a str, TileCodeError> {
    lookup(args, key).ok_or(TileCodeError::MissingKey { segment, key })
}

fn parse_int(value: &str, key: &'static str) -> Result<i64, TileCodeError> {
    value.parse().map_err(|_| TileCodeError::BadValue {
        key,
        value: value.to_string(),
    })
}

/// Revenue: `30`, `20|30|40|50` (positional yellow/green/brown/gray), or
/// `yellow_20|green_30|...` (color-keyed).
fn parse_revenue(value: &str) -> Result<Revenue, TileCodeError> {
    if !value.contains('|') && !value.contains('_') {
        return Ok(Revenue::Flat(parse_int(value, "revenue")?));
    }

    const POSITIONAL: [TileColor; 4] = [
        TileColor::Yellow,
        TileColor::Green,
        TileColor::Brown,
        TileColor::Gray,
    ];

    let mut entries = Vec::new();
    for (i, piece) in value.split('|').enumerate() {
        if let Some((color, amount)) = piece.split_once('_') {
            let color = TileColor::from_str(color).ok_or_else(|| TileCodeError::BadValue {
                key: "revenue",
                value: piece.to_string(),
            })?;
            entries.push((color, parse_int(amount, "revenue")?));
        } else {
            let color = *POSITIONAL.get(i).ok_or_else(|| TileCodeError::BadValue {
                key: "revenue",
                value: value.to_string(),
            })?;
            entries.push((color, parse_int(piece, "revenue")?));
        }
    }
    Ok(Revenue::ByColor(entries))
}

fn encode_revenue(revenue: &Revenue) -> String {
    match revenue {
        Revenue::Flat(v) => v.to_string(),
        Revenue::ByColor(entries) => {
            let pieces: Vec<_> = entries
                .iter()
                .map(|(color, v)| format!("{}_{v}", color.as_str()))
                .collect();
            pieces.join("|")
        }
    }
}

fn parse_endpoint(value: &str) -> Result<PathEnd, TileCodeError> {
    if let Some(node) = value.strip_prefix('_') {
        let node = node
            .parse()
            .map_err(|_| TileCodeError::BadEndpoint(value.to_string()))?;
        return Ok(PathEnd::Node(node));
    }
    let edge: u8 = value
        .parse()
        .map_err(|_| TileCodeError::BadEndpoint(value.to_string()))?;
    if edge > 5 {
        return Err(TileCodeError::BadEndpoint(value.to_string()));
    }
    Ok(PathEnd::Edge(edge))
}

fn encode_endpoint(end: PathEnd) -> String {
    match end {
        PathEnd::Edge(e) => e.to_string(),
        PathEnd::Node(n) => format!("_{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_city_with_slots() {
        let parts = parse("city=revenue:50,slots:2;path=a:0,b:_0;path=a:3,b:_0").unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[0],
            Part::City {
                revenue: Revenue::Flat(50),
                slots: 2
            }
        );
        assert_eq!(
            parts[1],
            Part::Path {
                a: PathEnd::Edge(0),
                b: PathEnd::Node(0)
            }
        );
    }

    #[test]
    fn test_parse_city_default_slots() {
        let parts = parse("city=revenue:30").unwrap();
        assert_eq!(
            parts[0],
            Part::City {
                revenue: Revenue::Flat(30),
                slots: 1
            }
        );
    }

    #[test]
    fn test_parse_offboard_color_revenue() {
        let parts = parse("offboard=revenue:yellow_40|brown_50;path=a:0,b:_0;path=a:1,b:_0").unwrap();
        assert_eq!(
            parts[0],
            Part::Offboard {
                revenue: Revenue::ByColor(vec![
                    (TileColor::Yellow, 40),
                    (TileColor::Brown, 50)
                ])
            }
        );
    }

    #[test]
    fn test_parse_positional_revenue() {
        let parts = parse("offboard=revenue:20|30|40|50").unwrap();
        assert_eq!(
            parts[0],
            Part::Offboard {
                revenue: Revenue::ByColor(vec![
                    (TileColor::Yellow, 20),
                    (TileColor::Green, 30),
                    (TileColor::Brown, 40),
                    (TileColor::Gray, 50),
                ])
            }
        );
    }

    #[test]
    fn test_parse_upgrade_and_icon() {
        let parts = parse("upgrade=cost:15,terrain:mountain;icon=image:18_usa/mine").unwrap();
        assert_eq!(
            parts[0],
            Part::Upgrade {
                cost: 15,
                terrain: vec![Terrain::Mountain]
            }
        );
        assert_eq!(
            parts[1],
            Part::Icon {
                image: "18_usa/mine".to_string()
            }
        );
    }

    #[test]
    fn test_parse_junction_and_edge_to_edge() {
        let parts = parse("junction;path=a:0,b:_0;path=a:1,b:4").unwrap();
        assert_eq!(parts[0], Part::Junction);
        assert_eq!(
            parts[2],
            Part::Path {
                a: PathEnd::Edge(1),
                b: PathEnd::Edge(4)
            }
        );
    }

    #[test]
    fn test_parse_trailing_semicolon() {
        // The original data carries trailing semicolons in places.
        let parts = parse("junction;path=a:0,b:_0;").unwrap();
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_parse_label() {
        let parts = parse("city=revenue:60,slots:2;label=NY").unwrap();
        assert_eq!(parts[1], Part::Label("NY".to_string()));
    }

    #[test]
    fn test_parse_halt() {
        let parts = parse("halt=revenue:10;path=a:0,b:_0;path=a:3,b:_0").unwrap();
        assert_eq!(parts[0], Part::Halt { revenue: 10 });
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse("fortress=hp:100"),
            Err(TileCodeError::UnknownSegment(_))
        ));
        assert!(matches!(
            parse("city=slots:2"),
            Err(TileCodeError::MissingKey {
                segment: "city",
                key: "revenue"
            })
        ));
        assert!(matches!(
            parse("path=a:9,b:_0"),
            Err(TileCodeError::BadEndpoint(_))
        ));
        assert!(matches!(
            parse("city=revenue:abc"),
            Err(TileCodeError::BadValue { .. })
        ));
        assert!(matches!(
            parse("city=revenue:30,slots:400"),
            Err(TileCodeError::BadValue { key: "slots", .. })
        ));
    }

    #[test]
    fn test_round_trip() {
        let codes = [
            "city=revenue:50,slots:2;path=a:0,b:_0;path=a:1,b:_0;path=a:3,b:_0;label=DFW",
            "offboard=revenue:yellow_20|green_30|brown_50|gray_60;path=a:2,b:_0",
            "junction;path=a:0,b:_0;path=a:1,b:_0;path=a:2,b:_0",
            "town=revenue:10;path=a:0,b:_0;path=a:3,b:_0",
            "upgrade=cost:10,terrain:water;city=revenue:0",
            "halt=revenue:10;path=a:1,b:_0;path=a:4,b:_0",
        ];

        for code in codes {
            let parts = parse(code).unwrap();
            let encoded = encode(&parts);
            let reparsed = parse(&encoded).unwrap();
            assert_eq!(parts, reparsed, "round trip failed for {code}");
        }
    }
}
