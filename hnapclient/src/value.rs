//! Modèle de données des charges utiles HNAP
//!
//! Les requêtes comme les réponses HNAP sont de simples arbres de champs
//! nommés. Aucun schéma n'est imposé : [`HnapMap`] conserve l'ordre
//! d'insertion (l'ordre des éléments XML), et chaque valeur est soit un
//! texte, soit une sous-table, soit un groupe répété.

use crate::soap::MarshalError;
use indexmap::IndexMap;
use serde::Serialize;

/// Table ordonnée nom de champ → valeur
pub type HnapMap = IndexMap<String, HnapValue>;

/// Valeur d'un champ HNAP
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HnapValue {
    /// Contenu texte d'un élément feuille
    Text(String),
    /// Élément contenant des champs distincts
    Map(HnapMap),
    /// Groupe répété : chaque entrée porte le nom de l'élément répété
    /// (ex: `SOAPActions` → `[{string: "..."}, {string: "..."}]`)
    List(Vec<HnapMap>),
}

impl HnapValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HnapValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HnapMap> {
        match self {
            HnapValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[HnapMap]> {
        match self {
            HnapValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// Entrées d'un groupe, qu'il ait été lu comme liste ou comme table
    ///
    /// Un groupe répété ne contenant qu'un seul élément est indiscernable
    /// d'une table à une entrée une fois lu depuis le XML ; cette méthode
    /// renvoie les deux formes sous forme de liste de paires.
    pub fn entries(&self) -> Vec<(&str, &HnapValue)> {
        match self {
            HnapValue::Text(_) => Vec::new(),
            HnapValue::Map(m) => m.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            HnapValue::List(l) => l
                .iter()
                .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v)))
                .collect(),
        }
    }
}

impl From<&str> for HnapValue {
    fn from(value: &str) -> Self {
        HnapValue::Text(value.to_string())
    }
}

impl From<String> for HnapValue {
    fn from(value: String) -> Self {
        HnapValue::Text(value)
    }
}

impl From<HnapMap> for HnapValue {
    fn from(value: HnapMap) -> Self {
        HnapValue::Map(value)
    }
}

impl From<Vec<HnapMap>> for HnapValue {
    fn from(value: Vec<HnapMap>) -> Self {
        HnapValue::List(value)
    }
}

/// Accès typés aux champs texte d'une [`HnapMap`]
pub trait HnapMapExt {
    /// Valeur texte du champ `key`, si présente
    fn text(&self, key: &str) -> Option<&str>;

    /// Valeur texte du champ `key`, ou [`MarshalError::MissingField`]
    fn require_text(&self, key: &str) -> Result<&str, MarshalError>;
}

impl HnapMapExt for HnapMap {
    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HnapValue::as_str)
    }

    fn require_text(&self, key: &str) -> Result<&str, MarshalError> {
        self.text(key)
            .ok_or_else(|| MarshalError::MissingField(key.to_string()))
    }
}

/// Construit une [`HnapMap`] à partir de paires `clé => valeur`
///
/// ```
/// use hnapclient::{hnap_map, HnapValue};
///
/// let body = hnap_map! {
///     "ModuleID" => "1",
///     "Controller" => "1",
/// };
/// assert_eq!(body.get("ModuleID"), Some(&HnapValue::from("1")));
/// ```
#[macro_export]
macro_rules! hnap_map {
    () => { $crate::HnapMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::HnapMap::new();
        $( map.insert(::std::string::String::from($key), $crate::HnapValue::from($value)); )+
        map
    }};
}
