use crate::decimal::Decimal;
use indexmap::IndexMap;
use std::fmt;

/// Identifies an indirect object: an object number paired with a generation number
/// (ISO 32000 §7.3.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    pub object_number: u32,
    pub generation: u16,
}

impl ObjectId {
    pub fn new(object_number: u32, generation: u16) -> Self {
        ObjectId { object_number, generation }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.object_number, self.generation)
    }
}

/// A PDF string is written either as a balanced-parenthesis literal or as a hex string;
/// both decode to the same byte sequence, but the original notation is kept so that a
/// writer could reproduce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Literal,
    Hexadecimal,
}

/// A stream's dictionary plus the byte offset of its (unmaterialised) body. The body itself
/// is never read by this crate; locating and decoding it is the outer reader's job.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStream {
    pub id: ObjectId,
    pub dictionary: PdfDictionary,
    pub stream_start_index: u64,
}

/// Every value the object parser can produce (ISO 32000 §7.3).
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(Decimal),
    String(Vec<u8>, StringFormat),
    Name(Vec<u8>),
    Array(Vec<PdfObject>),
    Dictionary(PdfDictionary),
    IndirectReference(ObjectId),
    IndirectObject { id: ObjectId, value: Box<PdfObject> },
    Stream(PdfStream),
}

impl PdfObject {
    pub fn enum_variant(&self) -> &'static str {
        match self {
            PdfObject::Null => "Null",
            PdfObject::Boolean(_) => "Boolean",
            PdfObject::Integer(_) => "Integer",
            PdfObject::Real(_) => "Real",
            PdfObject::String(..) => "String",
            PdfObject::Name(_) => "Name",
            PdfObject::Array(_) => "Array",
            PdfObject::Dictionary(_) => "Dictionary",
            PdfObject::IndirectReference(_) => "IndirectReference",
            PdfObject::IndirectObject { .. } => "IndirectObject",
            PdfObject::Stream(_) => "Stream",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PdfObject::Null)
    }

    pub fn as_dict(&self) -> Option<&PdfDictionary> {
        match self {
            PdfObject::Dictionary(dict) => Some(dict),
            PdfObject::Stream(stream) => Some(&stream.dictionary),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PdfObject]> {
        match self {
            PdfObject::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PdfObject::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&[u8]> {
        match self {
            PdfObject::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for PdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfObject::Null => write!(f, "null"),
            PdfObject::Boolean(value) => write!(f, "{value}"),
            PdfObject::Integer(value) => write!(f, "{value}"),
            PdfObject::Real(value) => write!(f, "{value}"),
            PdfObject::Name(name) => write!(f, "/{}", String::from_utf8_lossy(name)),
            PdfObject::String(text, StringFormat::Literal) => {
                write!(f, "({})", String::from_utf8_lossy(text))
            }
            PdfObject::String(text, StringFormat::Hexadecimal) => {
                write!(f, "<")?;
                for byte in text {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, ">")
            }
            PdfObject::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            PdfObject::Dictionary(dict) => write!(f, "{dict}"),
            PdfObject::IndirectReference(id) => write!(f, "{id}"),
            PdfObject::IndirectObject { id, value } => write!(f, "{id} obj {value} endobj"),
            PdfObject::Stream(stream) => write!(f, "{} stream...endstream", stream.dictionary),
        }
    }
}

/// A PDF dictionary: an ordered name→object mapping. Keys preserve first-insertion order;
/// re-inserting an existing key overwrites the value in place rather than moving it to the
/// back (`IndexMap::insert` semantics), matching ISO 32000's "last value wins" reading of
/// duplicate keys.
///
/// A `PdfDictionary` built by this crate's object parser never holds a key bound to
/// [`PdfObject::Null`] (§4.5 of the object-parser design: a null value drops the pair).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfDictionary(IndexMap<Vec<u8>, PdfObject>);

impl PdfDictionary {
    pub fn new() -> Self {
        PdfDictionary(IndexMap::new())
    }

    pub fn get(&self, key: &[u8]) -> Option<&PdfObject> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.0.contains_key(key)
    }

    /// Binds `key` to `value`, overwriting any previous binding in place. A `value` of
    /// [`PdfObject::Null`] removes the key instead, preserving the invariant that a
    /// dictionary never stores an explicit null.
    pub fn set(&mut self, key: Vec<u8>, value: PdfObject) {
        if value.is_null() {
            self.0.swap_remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Vec<u8>, PdfObject> {
        self.0.iter()
    }
}

impl fmt::Display for PdfDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<<")?;
        for (key, value) in &self.0 {
            write!(f, "/{} {}", String::from_utf8_lossy(key), value)?;
        }
        write!(f, ">>")
    }
}

impl<'a> IntoIterator for &'a PdfDictionary {
    type Item = (&'a Vec<u8>, &'a PdfObject);
    type IntoIter = indexmap::map::Iter<'a, Vec<u8>, PdfObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_overwrites_in_place() {
        let mut dict = PdfDictionary::new();
        dict.set(b"A".to_vec(), PdfObject::Integer(1));
        dict.set(b"B".to_vec(), PdfObject::Integer(2));
        dict.set(b"A".to_vec(), PdfObject::Integer(3));

        let keys: Vec<&[u8]> = dict.iter().map(|(k, _)| k.as_slice()).collect();
        assert_eq!(keys, vec![b"A".as_slice(), b"B".as_slice()]);
        assert_eq!(dict.get(b"A"), Some(&PdfObject::Integer(3)));
    }

    #[test]
    fn null_value_is_never_stored() {
        let mut dict = PdfDictionary::new();
        dict.set(b"A".to_vec(), PdfObject::Integer(1));
        dict.set(b"A".to_vec(), PdfObject::Null);
        assert!(!dict.contains_key(b"A"));
        assert!(dict.is_empty());
    }
}
