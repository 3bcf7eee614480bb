//! Vérification de la bonne formation des documents XML échangés

use super::MarshalError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use xmltree::Element;

/// Vérifie qu'une chaîne est un document XML bien formé
///
/// Lecture en flux avec quick-xml : balises équilibrées et cohérentes,
/// attributs valides, un seul élément racine, aucun texte hors racine.
/// Le document est ensuite chargé avec xmltree, qui résout les entités et
/// les préfixes d'espace de noms : tout document accepté ici est lisible
/// par [`from_xml`](super::from_xml) et [`parse_fault`](super::parse_fault).
pub fn validate_well_formed(xml: &str) -> Result<(), MarshalError> {
    check_structure(xml)?;
    Element::parse(xml.as_bytes())?;
    Ok(())
}

fn check_structure(xml: &str) -> Result<(), MarshalError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                check_attributes(&e)?;
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                check_attributes(&e)?;
                if depth == 0 {
                    roots += 1;
                }
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| MarshalError::IllFormed("unexpected closing tag".into()))?;
            }
            Event::Text(t) if depth == 0 => {
                if t.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Err(MarshalError::IllFormed(
                        "text content outside of the root element".into(),
                    ));
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            _ if depth == 0 => {
                return Err(MarshalError::IllFormed(
                    "content outside of the root element".into(),
                ));
            }
            _ => {}
        }

        if roots > 1 {
            return Err(MarshalError::IllFormed("multiple root elements".into()));
        }
    }

    if depth > 0 {
        return Err(MarshalError::IllFormed(format!(
            "{depth} unclosed element(s) at end of document"
        )));
    }
    if roots == 0 {
        return Err(MarshalError::IllFormed("no root element".into()));
    }
    Ok(())
}

fn check_attributes(start: &BytesStart<'_>) -> Result<(), MarshalError> {
    for attribute in start.attributes() {
        attribute.map_err(quick_xml::Error::from)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_documents() {
        for xml in [
            "<a/>",
            "<a></a>",
            r#"<?xml version="1.0"?><a x="1"><b>t</b><!-- c --></a>"#,
            "\n  <Login xmlns=\"http://purenetworks.com/HNAP1/\"><Action>login</Action></Login>\n",
        ] {
            assert!(validate_well_formed(xml).is_ok(), "{xml}");
        }
    }

    #[test]
    fn test_invalid_documents() {
        for xml in [
            "",
            "   ",
            "not xml at all",
            "<a>",
            "<a><b></a>",
            "<a></a></b>",
            "<a></a><b></b>",
            "<a></a>trailing",
            "<a x=1></a>",
            "<html><body>500 Internal Server Error",
        ] {
            assert!(validate_well_formed(xml).is_err(), "{xml:?}");
        }
    }

    #[test]
    fn test_entities_and_prefixes_are_resolved() {
        assert!(validate_well_formed("<a>&amp;&lt;&#65;</a>").is_ok());
        assert!(validate_well_formed(r#"<x:a xmlns:x="urn:x"><x:b/></x:a>"#).is_ok());

        assert!(matches!(
            validate_well_formed("<a>&bogus;</a>"),
            Err(MarshalError::Parse(_))
        ));
        assert!(matches!(
            validate_well_formed("<x:a></x:a>"),
            Err(MarshalError::Parse(_))
        ));
        assert!(matches!(
            validate_well_formed("<a><y:b/></a>"),
            Err(MarshalError::Parse(_))
        ));
    }
}
