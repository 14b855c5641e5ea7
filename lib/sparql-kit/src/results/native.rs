use oxrdf::vocab::xsd;
use oxrdf::{Literal, Term};
use oxsdatatypes::{Boolean, Date, DateTime, Decimal, Double, Duration, Time};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A binding value converted to the closest native type of its datatype.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeValue {
    Iri(String),
    BlankNode(String),
    String(String),
    LangString { value: String, language: String },
    Integer(i64),
    Decimal(Decimal),
    Double(f64),
    Boolean(bool),
    DateTime(DateTime),
    Date(Date),
    Time(Time),
    Duration(Duration),
}

impl NativeValue {
    /// Converts an RDF term.
    ///
    /// Literals whose lexical form is invalid for their datatype are kept as plain strings.
    pub fn from_term(term: &Term) -> Self {
        match term {
            Term::NamedNode(node) => Self::Iri(node.as_str().to_owned()),
            Term::BlankNode(node) => Self::BlankNode(node.as_str().to_owned()),
            Term::Literal(literal) => Self::from_literal(literal),
            #[allow(unreachable_patterns, reason = "Quoted triples only exist with RDF-star")]
            other => Self::String(other.to_string()),
        }
    }

    pub fn from_literal(literal: &Literal) -> Self {
        let value = literal.value();
        if let Some(language) = literal.language() {
            return Self::LangString {
                value: value.to_owned(),
                language: language.to_owned(),
            };
        }
        let datatype = literal.datatype();
        let converted = if datatype == xsd::INTEGER
            || datatype == xsd::INT
            || datatype == xsd::LONG
            || datatype == xsd::SHORT
            || datatype == xsd::BYTE
            || datatype == xsd::NON_NEGATIVE_INTEGER
            || datatype == xsd::POSITIVE_INTEGER
            || datatype == xsd::NON_POSITIVE_INTEGER
            || datatype == xsd::NEGATIVE_INTEGER
            || datatype == xsd::UNSIGNED_LONG
            || datatype == xsd::UNSIGNED_INT
            || datatype == xsd::UNSIGNED_SHORT
            || datatype == xsd::UNSIGNED_BYTE
        {
            value.parse().ok().map(Self::Integer)
        } else if datatype == xsd::DECIMAL {
            Decimal::from_str(value).ok().map(Self::Decimal)
        } else if datatype == xsd::DOUBLE || datatype == xsd::FLOAT {
            Double::from_str(value).ok().map(|v| Self::Double(v.into()))
        } else if datatype == xsd::BOOLEAN {
            Boolean::from_str(value).ok().map(|v| Self::Boolean(v.into()))
        } else if datatype == xsd::DATE_TIME {
            DateTime::from_str(value).ok().map(Self::DateTime)
        } else if datatype == xsd::DATE {
            Date::from_str(value).ok().map(Self::Date)
        } else if datatype == xsd::TIME {
            Time::from_str(value).ok().map(Self::Time)
        } else if datatype == xsd::DURATION
            || datatype == xsd::DAY_TIME_DURATION
            || datatype == xsd::YEAR_MONTH_DURATION
        {
            Duration::from_str(value).ok().map(Self::Duration)
        } else {
            None
        };
        converted.unwrap_or_else(|| Self::String(value.to_owned()))
    }

    /// The identifier of an IRI or a blank node.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Iri(id) | Self::BlankNode(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(v) | Self::BlankNode(v) | Self::String(v) => f.write_str(v),
            Self::LangString { value, .. } => f.write_str(value),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::Time(v) => write!(f, "{v}"),
            Self::Duration(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for NativeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Iri(v) | Self::BlankNode(v) | Self::String(v) => serializer.serialize_str(v),
            Self::LangString { value, .. } => serializer.serialize_str(value),
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::Decimal(_)
            | Self::DateTime(_)
            | Self::Date(_)
            | Self::Time(_)
            | Self::Duration(_) => serializer.collect_str(self),
        }
    }
}

/// One solution: variable names to values, in the order of the result head.
///
/// Unbound variables are absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NativeBinding(Vec<(String, NativeValue)>);

impl NativeBinding {
    pub fn get(&self, variable: &str) -> Option<&NativeValue> {
        self.0
            .iter()
            .find_map(|(name, value)| (name == variable).then_some(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NativeValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, variable: String, value: NativeValue) {
        self.0.push((variable, value));
    }
}

impl Serialize for NativeBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// SELECT results with native values.
///
/// Serializes with the envelope of SPARQL results JSON:
/// `{"head": {"vars": [...]}, "results": {"bindings": [...]}}`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NativeSolutions {
    pub variables: Vec<String>,
    pub bindings: Vec<NativeBinding>,
}

impl Serialize for NativeSolutions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Head<'a> {
            vars: &'a [String],
        }

        #[derive(Serialize)]
        struct Results<'a> {
            bindings: &'a [NativeBinding],
        }

        let mut state = serializer.serialize_struct("NativeSolutions", 2)?;
        state.serialize_field(
            "head",
            &Head {
                vars: &self.variables,
            },
        )?;
        state.serialize_field(
            "results",
            &Results {
                bindings: &self.bindings,
            },
        )?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, NamedNode};

    fn typed(value: &str, datatype: oxrdf::NamedNodeRef<'_>) -> NativeValue {
        NativeValue::from_literal(&Literal::new_typed_literal(value, datatype))
    }

    #[test]
    fn converts_numbers() {
        assert_eq!(typed("42", xsd::INTEGER), NativeValue::Integer(42));
        assert_eq!(typed("-7", xsd::INT), NativeValue::Integer(-7));
        assert_eq!(typed("2.5", xsd::DOUBLE), NativeValue::Double(2.5));
        assert_eq!(
            typed("1.10", xsd::DECIMAL),
            NativeValue::Decimal(Decimal::from_str("1.1").unwrap())
        );
    }

    #[test]
    fn converts_booleans_and_dates() {
        assert_eq!(typed("true", xsd::BOOLEAN), NativeValue::Boolean(true));
        assert_eq!(typed("0", xsd::BOOLEAN), NativeValue::Boolean(false));
        assert!(matches!(
            typed("2024-01-02T03:04:05Z", xsd::DATE_TIME),
            NativeValue::DateTime(_)
        ));
        assert!(matches!(typed("2024-01-02", xsd::DATE), NativeValue::Date(_)));
        assert!(matches!(typed("P1D", xsd::DURATION), NativeValue::Duration(_)));
    }

    #[test]
    fn invalid_lexical_forms_stay_strings() {
        assert_eq!(
            typed("many", xsd::INTEGER),
            NativeValue::String("many".to_owned())
        );
    }

    #[test]
    fn keeps_languages_and_plain_strings() {
        assert_eq!(
            NativeValue::from_literal(&Literal::new_language_tagged_literal_unchecked(
                "chat", "fr"
            )),
            NativeValue::LangString {
                value: "chat".to_owned(),
                language: "fr".to_owned()
            }
        );
        assert_eq!(
            NativeValue::from_literal(&Literal::new_simple_literal("cat")),
            NativeValue::String("cat".to_owned())
        );
        assert_eq!(
            typed("x", oxrdf::NamedNodeRef::new_unchecked("http://example.com/dt")),
            NativeValue::String("x".to_owned())
        );
    }

    #[test]
    fn identifiers_keep_their_kind() {
        let iri = NativeValue::from_term(&NamedNode::new_unchecked("http://example.com/a").into());
        assert_eq!(iri, NativeValue::Iri("http://example.com/a".to_owned()));
        assert_eq!(iri.as_identifier(), Some("http://example.com/a"));
        let bnode = NativeValue::from_term(&BlankNode::new_unchecked("b0").into());
        assert_eq!(bnode, NativeValue::BlankNode("b0".to_owned()));
    }

    #[test]
    fn serializes_with_the_results_envelope() {
        let mut binding = NativeBinding::default();
        binding.push("count".to_owned(), NativeValue::Integer(3));
        let solutions = NativeSolutions {
            variables: vec!["count".to_owned()],
            bindings: vec![binding],
        };
        assert_eq!(
            serde_json::to_string(&solutions).unwrap(),
            r#"{"head":{"vars":["count"]},"results":{"bindings":[{"count":3}]}}"#
        );
    }
}
