//! Serialization and Deserialization implementation

use ::serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{table::AllocationTable, Metadata, Prefix, PrefixTrie};

/// A prefix with metadata is written as a map with an `address` key.
#[derive(Serialize)]
struct EntryRef<'a> {
    address: String,
    #[serde(flatten)]
    metadata: &'a Metadata,
}

#[derive(Deserialize)]
struct Entry {
    address: String,
    #[serde(flatten)]
    metadata: Metadata,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PrefixRepr {
    Cidr(String),
    Entry(Entry),
}

impl Serialize for Prefix {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.metadata().is_empty() {
            serializer.serialize_str(&self.cidr())
        } else {
            EntryRef {
                address: self.cidr(),
                metadata: self.metadata(),
            }
            .serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Prefix {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (address, metadata) = match PrefixRepr::deserialize(deserializer)? {
            PrefixRepr::Cidr(address) => (address, Metadata::new()),
            PrefixRepr::Entry(Entry { address, metadata }) => (address, metadata),
        };
        Prefix::from_cidr(&address)
            .map(|prefix| prefix.with_metadata(metadata))
            .map_err(de::Error::custom)
    }
}

impl Serialize for PrefixTrie {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        AllocationTable::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PrefixTrie {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        AllocationTable::deserialize(deserializer)?
            .into_trie()
            .map_err(de::Error::custom)
    }
}
