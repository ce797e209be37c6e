use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::BufRead;

/// Name of the manifest entry at the root of every backup archive.
pub const MANIFEST: &str = "Manifest.xml";
const DATABASE_ELEMENT: &[u8] = b"Database";
const UID_ATTRIBUTE: &[u8] = b"uid";

/// One database listed in the manifest, resolved to its place in the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub id: u32,
    pub internal_path: String,
}

impl ManifestEntry {
    fn new(name: String, id: u32) -> Self {
        Self { internal_path: format!("Databases/{id}.dat"), name, id }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Listing {
    name: String,
    uid: Option<String>,
}

/// The `Database` elements of a manifest, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    listings: Vec<Listing>,
}

impl Manifest {
    /// Parse a manifest document.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::MalformedManifest`] if the document is not well-formed XML.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut xml = Reader::from_reader(reader);
        let mut buf = Vec::new();
        let mut listings = Vec::new();
        let mut current: Option<Listing> = None;
        loop {
            let event = xml.read_event_into(&mut buf).or_raise(|| malformed("not well-formed XML"))?;
            match event {
                Event::Start(e) if e.local_name().as_ref() == DATABASE_ELEMENT => {
                    current = Some(Listing { name: String::new(), uid: uid(&e)? });
                },
                Event::Empty(e) if e.local_name().as_ref() == DATABASE_ELEMENT => {
                    listings.push(Listing { name: String::new(), uid: uid(&e)? });
                },
                Event::Text(e) => {
                    if let Some(listing) = current.as_mut() {
                        let text = e.unescape().or_raise(|| malformed("bad text content"))?;
                        listing.name.push_str(&text);
                    }
                },
                Event::CData(e) => {
                    if let Some(listing) = current.as_mut() {
                        let text = e.decode().or_raise(|| malformed("bad text content"))?;
                        listing.name.push_str(&text);
                    }
                },
                Event::End(e) if e.local_name().as_ref() == DATABASE_ELEMENT => {
                    listings.extend(current.take());
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }
        tracing::debug!(databases = listings.len(), "manifest parsed");
        Ok(Self { listings })
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Database names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.listings.iter().map(|l| l.name.as_str())
    }

    /// Resolve the first database whose text equals `name` exactly.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::DatabaseNotFound`] if no entry matches, or
    /// [`ErrorKind::MalformedManifest`] if the match has a missing or
    /// non-numeric `uid`.
    pub fn find(&self, name: &str) -> Result<ManifestEntry> {
        let listing = self
            .listings
            .iter()
            .find(|l| l.name == name)
            .ok_or_raise(|| ErrorKind::DatabaseNotFound(name.to_owned()))?;
        let uid = listing.uid.as_deref().ok_or_raise(|| malformed("database without uid"))?;
        let id = uid.trim().parse::<u32>().or_raise(|| malformed("non-numeric uid"))?;
        Ok(ManifestEntry::new(listing.name.clone(), id))
    }
}

fn malformed(reason: &str) -> ErrorKind {
    ErrorKind::MalformedManifest(reason.to_owned())
}

fn uid(element: &BytesStart<'_>) -> Result<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute.or_raise(|| malformed("bad attribute"))?;
        if attribute.key.local_name().as_ref() == UID_ATTRIBUTE {
            let value = attribute.unescape_value().or_raise(|| malformed("bad attribute"))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<BlackBerry_Backup>
  <Version>3.0</Version>
  <NessusOSDevice>
    <Databases>
      <Database uid="1" recordcount="4">Address Book</Database>
      <Database uid="17" recordcount="112">SMS Messages</Database>
      <Database uid="23">SMS Messages</Database>
      <Database uid="x9">Broken</Database>
      <Database>No Id</Database>
      <Database uid="31">Tom &amp; Jerry</Database>
    </Databases>
  </NessusOSDevice>
</BlackBerry_Backup>"#;

    fn manifest() -> Manifest {
        Manifest::parse(DOCUMENT.as_bytes()).unwrap()
    }

    #[test]
    fn lists_databases_in_order() {
        let manifest = manifest();
        assert_eq!(manifest.len(), 6);
        assert_eq!(manifest.names().next(), Some("Address Book"));
    }

    #[rstest]
    #[case("SMS Messages", 17, "Databases/17.dat")]
    #[case("Address Book", 1, "Databases/1.dat")]
    #[case("Tom & Jerry", 31, "Databases/31.dat")]
    fn resolves_first_match(#[case] name: &str, #[case] id: u32, #[case] path: &str) {
        let entry = manifest().find(name).unwrap();
        assert_eq!(entry, ManifestEntry { name: name.to_owned(), id, internal_path: path.to_owned() });
    }

    #[rstest]
    #[case("sms messages")]
    #[case("SMS Messages ")]
    #[case("")]
    fn match_is_exact(#[case] name: &str) {
        let err = manifest().find(name).unwrap_err();
        assert_eq!(*err, ErrorKind::DatabaseNotFound(name.to_owned()));
    }

    #[rstest]
    #[case("Broken")]
    #[case("No Id")]
    fn unusable_uid(#[case] name: &str) {
        let err = manifest().find(name).unwrap_err();
        assert!(matches!(*err, ErrorKind::MalformedManifest(_)));
    }

    #[rstest]
    #[case("<Databases><Database uid=\"1\">SMS</Databases>")]
    #[case("<Database uid=1>SMS</Database>")]
    fn not_well_formed(#[case] document: &str) {
        let err = Manifest::parse(document.as_bytes()).unwrap_err();
        assert!(matches!(*err, ErrorKind::MalformedManifest(_)));
    }

    #[test]
    fn cdata_name() {
        let manifest = Manifest::parse(r#"<Database uid="5"><![CDATA[A<B]]></Database>"#.as_bytes()).unwrap();
        assert_eq!(manifest.find("A<B").unwrap().id, 5);
    }
}
