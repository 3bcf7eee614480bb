//! Conversion entre [`HnapMap`] et fragments XML

use super::MarshalError;
use crate::value::{HnapMap, HnapValue};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::collections::HashSet;
use xmltree::Element;

/// Sérialise une table en fragment XML (un élément par entrée, sans racine)
///
/// Les textes vides sont écrits `<Champ></Champ>` : certains firmwares
/// refusent la forme auto-fermante pour `LoginPassword` et `Captcha`.
pub fn to_xml(map: &HnapMap) -> Result<String, MarshalError> {
    let mut writer = Writer::new(Vec::new());
    write_fields(&mut writer, map)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| MarshalError::IllFormed(format!("non UTF-8 output: {e}")))
}

fn write_fields(writer: &mut Writer<Vec<u8>>, map: &HnapMap) -> Result<(), MarshalError> {
    for (name, value) in map {
        write_field(writer, name, value)?;
    }
    Ok(())
}

fn write_field(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &HnapValue,
) -> Result<(), MarshalError> {
    if !is_valid_name(name) {
        return Err(MarshalError::InvalidName(name.to_string()));
    }

    writer.write_event(Event::Start(BytesStart::new(name)))?;
    match value {
        HnapValue::Text(text) => {
            if !text.is_empty() {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
        }
        HnapValue::Map(map) => write_fields(writer, map)?,
        HnapValue::List(items) => {
            for item in items {
                write_fields(writer, item)?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Nom d'élément XML acceptable (sous-ensemble ASCII des noms XML, sans préfixe)
///
/// Les champs héritent de l'espace de noms HNAP de l'élément méthode ; un
/// préfixe ne serait lié à aucune déclaration.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Lit un document XML et renvoie les champs de sa charge utile
///
/// Si la racine est une enveloppe SOAP, la charge utile est le premier
/// élément de `Body` (ex: `LoginResponse`) ; sinon c'est la racine elle-même.
/// Les enfants de la charge utile deviennent les entrées de la table.
pub fn from_xml(xml: &str) -> Result<HnapMap, MarshalError> {
    let root = Element::parse(xml.as_bytes())?;

    if root.name != "Envelope" {
        return Ok(element_fields(&root));
    }

    let body = root
        .get_child("Body")
        .ok_or_else(|| MarshalError::MissingField("Body".to_string()))?;

    Ok(body
        .children
        .iter()
        .find_map(|node| node.as_element())
        .map(element_fields)
        .unwrap_or_default())
}

fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| node.as_element())
}

/// Champs d'un élément ; en cas de doublon au premier niveau, la dernière valeur l'emporte
fn element_fields(element: &Element) -> HnapMap {
    child_elements(element)
        .map(|child| (child.name.clone(), element_value(child)))
        .collect()
}

fn element_value(element: &Element) -> HnapValue {
    let children: Vec<&Element> = child_elements(element).collect();

    if children.is_empty() {
        let text = element.get_text().map(|t| t.into_owned()).unwrap_or_default();
        return HnapValue::Text(text);
    }

    let mut seen = HashSet::new();
    let repeated = children.iter().any(|child| !seen.insert(child.name.as_str()));

    if repeated {
        HnapValue::List(
            children
                .into_iter()
                .map(|child| {
                    let mut entry = HnapMap::new();
                    entry.insert(child.name.clone(), element_value(child));
                    entry
                })
                .collect(),
        )
    } else {
        HnapValue::Map(element_fields(element))
    }
}
