// ABOUTME: Parser for timed-text caption XML (legacy <text start dur> and srv3 <p t d> formats).
// ABOUTME: Produces Caption values with decoded, whitespace-collapsed text.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use scraper::Html;

use super::Caption;
use crate::dom::normalize_spaces;

/// Which timing attributes the current caption element uses.
#[derive(Debug, Clone, Copy)]
enum Timing {
    /// `<text start="1.5" dur="2.0">`, seconds.
    Seconds,
    /// `<p t="1500" d="2000">`, milliseconds.
    Millis,
}

/// Gets an attribute value from an XML element.
fn get_attribute(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        if key == name {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}

fn parse_number(value: Option<String>) -> f64 {
    value.and_then(|v| v.trim().parse::<f64>().ok()).unwrap_or(0.0)
}

/// Resolve the predefined XML entities and numeric character references.
fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Caption text is often escaped twice (`&amp;#39;`); the XML layer removes
/// one level and this removes what is left.
fn decode_caption_text(raw: &str) -> String {
    let text = if raw.contains('&') && !raw.contains('<') {
        Html::parse_fragment(raw).root_element().text().collect::<String>()
    } else {
        raw.to_string()
    };
    normalize_spaces(&text)
}

/// Parse timed-text XML into captions, in document order.
///
/// Captions with no text are skipped. Returns an error only for malformed XML.
pub fn parse_timedtext(xml: &str) -> anyhow::Result<Vec<Caption>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut captions = Vec::new();

    // (start, duration, text) of the caption element being read
    let mut current: Option<(f64, f64, String)> = None;
    let mut depth_in_caption = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if current.is_some() {
                    // nested <s> word spans inside srv3 <p>
                    depth_in_caption += 1;
                } else {
                    let timing = match e.name().as_ref() {
                        b"text" => Some(Timing::Seconds),
                        b"p" => Some(Timing::Millis),
                        _ => None,
                    };
                    if let Some(timing) = timing {
                        let (start, duration) = match timing {
                            Timing::Seconds => (
                                parse_number(get_attribute(e, "start")),
                                parse_number(get_attribute(e, "dur")),
                            ),
                            Timing::Millis => (
                                parse_number(get_attribute(e, "t")) / 1000.0,
                                parse_number(get_attribute(e, "d")) / 1000.0,
                            ),
                        };
                        current = Some((start, duration, String::new()));
                        depth_in_caption = 0;
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"br" {
                    if let Some((_, _, ref mut text)) = current {
                        text.push(' ');
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some((_, _, ref mut text)) = current {
                    text.push_str(&e.decode()?);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some((_, _, ref mut text)) = current {
                    text.push_str(&String::from_utf8_lossy(&e[..]));
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if let Some((_, _, ref mut text)) = current {
                    let name = e.decode()?;
                    match resolve_reference(&name) {
                        Some(ch) => text.push(ch),
                        None => {
                            text.push('&');
                            text.push_str(&name);
                            text.push(';');
                        }
                    }
                }
            }
            Ok(Event::End(_)) => {
                if depth_in_caption > 0 {
                    depth_in_caption -= 1;
                } else if let Some((start, duration, raw)) = current.take() {
                    let text = decode_caption_text(&raw);
                    if !text.is_empty() {
                        captions.push(Caption {
                            start,
                            duration,
                            text,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "malformed caption XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(captions)
}
