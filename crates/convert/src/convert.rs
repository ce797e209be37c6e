use crate::error::{ErrorKind, Result};
use crate::input::InputKind;
use crate::progress::{Event, Progress};
use exn::{OptionExt, ResultExt};
use ipdsms_container::{Container, Header};
use ipdsms_export::{ExportOptions, Exporter};
use ipdsms_message::{Message, decode};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::instrument;

/// How to pick the message sub-database out of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A known owner id, used as is.
    Id(u32),
    /// A directory name, matched byte for byte.
    Name(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Owner id to read instead of looking the database up by name. Zero
    /// counts as unset.
    pub database_id: Option<u32>,
    /// Directory name of the message database in a bare container.
    pub container_database: Vec<u8>,
    /// Manifest name of the message database in an archive.
    pub archive_database: String,
    pub export: ExportOptions,
    pub progress: Progress,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            database_id: None,
            container_database: b"SMS Messages\0".to_vec(),
            archive_database: "SMS Messages".to_owned(),
            export: ExportOptions::default(),
            progress: Progress::default(),
        }
    }
}

impl ConvertOptions {
    /// Selector for a container, preferring a non-zero id from the options
    /// and then `fallback` (the manifest uid of an archive) over the name.
    fn container_selector(&self, fallback: Option<u32>) -> Selector {
        match self.database_id.filter(|&id| id > 0).or(fallback.filter(|&id| id > 0)) {
            Some(id) => Selector::Id(id),
            None => Selector::Name(self.container_database.clone()),
        }
    }
}

/// Decode every message of the selected sub-database from raw container bytes.
///
/// # Errors
///
/// Fails with [`ErrorKind::Format`] for damaged input and
/// [`ErrorKind::NotFound`] when a selected name is not in the directory.
pub fn parse(bytes: &[u8], selector: &Selector) -> Result<Vec<Message>> {
    read_messages(bytes, selector, &Progress::default())
}

/// Stream a container from `reader` and decode the selected sub-database.
#[instrument(skip(reader, progress), fields(messages))]
pub fn read_messages<R: Read>(reader: R, selector: &Selector, progress: &Progress) -> Result<Vec<Message>> {
    let container = Container::open(reader).map_err(ErrorKind::container)?;
    let header = container.header();
    ensure_recognized(header)?;
    progress.emit(Event::Opened { version: header.version, databases: header.databases });
    let catalog = container.enumerate().map_err(ErrorKind::container)?;
    let id = match selector {
        Selector::Id(id) => *id,
        Selector::Name(name) => catalog
            .directory()
            .find(name)
            .ok_or_raise(|| ErrorKind::NotFound(display_name(name)))?
            .index(),
    };
    if catalog.directory().get(id).is_none() {
        tracing::debug!(id, "owner id is not in the directory");
    }
    progress.emit(Event::DatabaseLocated { id });

    let mut records = catalog.records(id);
    let mut messages = Vec::new();
    loop {
        progress.check()?;
        let Some(frame) = records.step() else {
            break;
        };
        if let Some(record) = frame.map_err(ErrorKind::container)? {
            messages.push(decode(&record).map_err(ErrorKind::message)?);
        }
        progress.emit(Event::RecordsProcessed(records.processed()));
    }
    tracing::Span::current().record("messages", messages.len());
    tracing::debug!(processed = records.processed(), "records streamed");
    Ok(messages)
}

/// Convert the backup at `input` into an XML document at `output`.
///
/// Returns the number of messages written. Zero messages is a successful
/// outcome, and then no output file is created.
#[instrument(skip_all, fields(input = %input.as_ref().display(), kind, messages))]
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>, options: &ConvertOptions) -> Result<usize> {
    let input = input.as_ref();
    let kind = InputKind::detect(input)?;
    tracing::Span::current().record("kind", tracing::field::debug(kind));
    let messages = match kind {
        InputKind::Container => {
            let reader = BufReader::new(File::open(input).or_raise(|| ErrorKind::Io)?);
            read_messages(reader, &options.container_selector(None), &options.progress)?
        },
        InputKind::Archive => {
            let extracted = ipdsms_archive::extract(input, &options.archive_database).map_err(ErrorKind::archive)?;
            let selector = options.container_selector(Some(extracted.id()));
            let reader = extracted.open().map_err(ErrorKind::archive)?;
            read_messages(reader, &selector, &options.progress)?
        },
    };
    tracing::Span::current().record("messages", messages.len());
    if messages.is_empty() {
        tracing::info!("no messages found, nothing written");
        return Ok(0);
    }
    options.progress.check()?;
    let written = Exporter::new(options.export.clone())
        .write_to_path(output, &messages)
        .map_err(ErrorKind::export)?;
    options.progress.emit(Event::Exported { messages: written });
    tracing::info!(written, "conversion complete");
    Ok(written)
}

/// One row of an [`Inventory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSummary {
    pub index: u32,
    pub name: String,
    pub records: u64,
}

/// Header and per-database record counts of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub header: Header,
    pub databases: Vec<DatabaseSummary>,
}

/// Count the records of every sub-database in the backup at `input`. For an
/// archive, the database named by `options.archive_database` is inspected.
#[instrument(skip_all, fields(input = %input.as_ref().display()))]
pub fn inspect(input: impl AsRef<Path>, options: &ConvertOptions) -> Result<Inventory> {
    let input = input.as_ref();
    match InputKind::detect(input)? {
        InputKind::Container => inventory(BufReader::new(File::open(input).or_raise(|| ErrorKind::Io)?)),
        InputKind::Archive => {
            let extracted = ipdsms_archive::extract(input, &options.archive_database).map_err(ErrorKind::archive)?;
            inventory(extracted.open().map_err(ErrorKind::archive)?)
        },
    }
}

/// Count the records of every sub-database in a container stream.
pub fn inventory<R: Read>(reader: R) -> Result<Inventory> {
    let container = Container::open(reader).map_err(ErrorKind::container)?;
    let header = container.header();
    ensure_recognized(header)?;
    let catalog = container.enumerate().map_err(ErrorKind::container)?;
    let mut databases: Vec<DatabaseSummary> = catalog
        .directory()
        .iter()
        .map(|db| DatabaseSummary { index: db.index(), name: db.display_name().into_owned(), records: 0 })
        .collect();
    let mut orphans = 0u64;
    for record in catalog.all_records() {
        let owner = usize::from(record.map_err(ErrorKind::container)?.owner());
        match databases.get_mut(owner) {
            Some(summary) => summary.records += 1,
            None => orphans += 1,
        }
    }
    if orphans > 0 {
        tracing::warn!(orphans, "records owned by no listed database");
    }
    Ok(Inventory { header, databases })
}

fn ensure_recognized(header: Header) -> Result<()> {
    if !header.is_recognized() {
        exn::bail!(ErrorKind::Format(format!(
            "unrecognized container (version {}, {} databases)",
            header.version, header.databases
        )));
    }
    Ok(())
}

fn display_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).trim_end_matches('\0').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipdsms_container::fixtures::{ContainerBuilder, RecordBuilder};
    use rstest::rstest;
    use std::io::{Cursor, Write};
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::sync::mpsc::channel;

    const SENT: u64 = 1_262_704_020_000; // 2010-01-05T15:07:00Z
    const RECEIVED: u64 = 1_262_704_080_000; // 2010-01-05T15:08:00Z

    fn timing(flag: u8) -> Vec<u8> {
        let mut data = vec![0u8; 29];
        data[0] = flag;
        data[13..21].copy_from_slice(&SENT.to_le_bytes());
        data[21..29].copy_from_slice(&RECEIVED.to_le_bytes());
        data
    }

    fn number(digits: &str) -> Vec<u8> {
        [&[0u8; 4][..], digits.as_bytes(), &[0]].concat()
    }

    fn sms(flag: u8, digits: &str, body: &[u8]) -> Vec<u8> {
        sms_encoded(flag, digits, 0, body)
    }

    fn sms_encoded(flag: u8, digits: &str, encoding: u8, body: &[u8]) -> Vec<u8> {
        RecordBuilder::new()
            .field(1, &timing(flag))
            .field(2, &number(digits))
            .field(7, &[encoding])
            .field(4, body)
            .build()
    }

    fn write_archive(path: &Path, uid: u32, entry: &str, database: &[u8]) {
        let manifest = format!(
            r#"<BlackBerry_Backup><NessusOSDevice><Databases>
            <Database uid="{uid}">SMS Messages</Database>
            </Databases></NessusOSDevice></BlackBerry_Backup>"#
        );
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("Manifest.xml", options).unwrap();
        zip.write_all(manifest.as_bytes()).unwrap();
        zip.start_file(entry, options).unwrap();
        zip.write_all(database).unwrap();
        zip.finish().unwrap();
    }

    fn device() -> Vec<u8> {
        ContainerBuilder::new(2)
            .database(b"Address Book\0")
            .database(b"SMS Messages\0")
            .record(0, b"not a message")
            .record(1, &sms(0, "5551234", b"Hello"))
            .record(0, b"still not a message")
            .record(1, &sms(1, "5559876", b"Reply"))
            .build()
    }

    const EXPECTED_XML: &str = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
        "<?xml-stylesheet type=\"text/xsl\" href=\"sms.xsl\"?>\n",
        "<smses count=\"1\">\n",
        "  <sms protocol=\"0\" address=\"5551234\" date=\"1262704020000\" type=\"2\" subject=\"null\" ",
        "body=\"Hello\" toa=\"null\" sc_toa=\"null\" service_center=\"null\" read=\"1\" status=\"-1\" ",
        "locked=\"0\" readable_date=\"Jan 05, 2010 3:07 PM\" contact_name=\"(Unknown)\"/>\n",
        "</smses>\n",
    );

    fn sms_selector() -> Selector {
        Selector::Name(b"SMS Messages\0".to_vec())
    }

    #[test]
    fn parse_selects_by_name() {
        let messages = parse(&device(), &sms_selector()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].number, "5551234");
        assert_eq!(messages[0].text(), "Hello");
        assert!(messages[0].is_outgoing());
        assert_eq!(messages[1].text(), "Reply");
        assert!(!messages[1].is_outgoing());
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 2)]
    #[case(5, 0)]
    fn parse_selects_by_id(#[case] id: u32, #[case] expected: usize) {
        let bytes = ContainerBuilder::new(1)
            .database(b"SMS Messages\0")
            .database(b"Other\0")
            .record(1, &sms(0, "1", b"a"))
            .record(1, &sms(0, "2", b"b"))
            .build();
        assert_eq!(parse(&bytes, &Selector::Id(id)).unwrap().len(), expected);
    }

    #[rstest]
    #[case(b"SMS Messages".as_slice())]
    #[case(b"sms messages\0".as_slice())]
    fn name_must_match_exactly(#[case] name: &[u8]) {
        let err = parse(&device(), &Selector::Name(name.to_vec())).unwrap_err();
        assert!(matches!(*err, ErrorKind::NotFound(_)));
    }

    #[rstest]
    #[case(ContainerBuilder::new(0).database(b"SMS Messages\0").build())]
    #[case(ContainerBuilder::new(1).build())]
    fn unrecognized_container(#[case] bytes: Vec<u8>) {
        let err = parse(&bytes, &sms_selector()).unwrap_err();
        assert!(matches!(*err, ErrorKind::Format(_)));
    }

    #[test]
    fn bad_header() {
        let err = parse(b"Not a backup at all", &sms_selector()).unwrap_err();
        assert_eq!(*err, ErrorKind::Format("bad header".into()));
    }

    #[test]
    fn truncated_record() {
        let mut bytes = device();
        bytes.truncate(bytes.len() - 3);
        let err = parse(&bytes, &sms_selector()).unwrap_err();
        assert_eq!(*err, ErrorKind::Format("truncated record".into()));
    }

    #[test]
    fn parse_is_idempotent() {
        let bytes = device();
        assert_eq!(parse(&bytes, &sms_selector()).unwrap(), parse(&bytes, &sms_selector()).unwrap());
    }

    #[test]
    fn progress_events() {
        let (tx, rx) = channel();
        let progress = Progress::new().with_sender(tx);
        read_messages(Cursor::new(device()), &sms_selector(), &progress).unwrap();
        drop(progress);
        let events: Vec<Event> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                Event::Opened { version: 2, databases: 2 },
                Event::DatabaseLocated { id: 1 },
                Event::RecordsProcessed(1),
                Event::RecordsProcessed(2),
                Event::RecordsProcessed(3),
                Event::RecordsProcessed(4),
            ]
        );
    }

    #[test]
    fn progress_counts_frames_of_other_databases() {
        let bytes = ContainerBuilder::new(1)
            .database(b"SMS Messages\0")
            .database(b"Memos\0")
            .record(1, b"memo")
            .record(1, b"memo")
            .record(1, b"memo")
            .build();
        let (tx, rx) = channel();
        let progress = Progress::new().with_sender(tx);
        assert!(read_messages(Cursor::new(bytes), &sms_selector(), &progress).unwrap().is_empty());
        drop(progress);
        let processed: Vec<u64> = rx
            .iter()
            .filter_map(|event| match event {
                Event::RecordsProcessed(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(processed, vec![1, 2, 3]);
    }

    #[test]
    fn convert_container_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("device.ipd");
        let output = dir.path().join("device.xml");
        let bytes = ContainerBuilder::new(1)
            .database(b"SMS Messages\0")
            .record(0, &sms(0, "5551234", b"Hello"))
            .build();
        std::fs::write(&input, bytes).unwrap();
        let (tx, rx) = channel();
        let options = ConvertOptions { progress: Progress::new().with_sender(tx), ..ConvertOptions::default() };
        assert_eq!(convert(&input, &output, &options).unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), EXPECTED_XML);
        drop(options);
        assert_eq!(rx.iter().last(), Some(Event::Exported { messages: 1 }));
    }

    #[test]
    fn convert_archive_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("backup.bbb");
        let output = dir.path().join("backup.xml");
        // Inside an archive the owner id is the manifest uid, not a directory index.
        let database = ContainerBuilder::new(1)
            .database(b"SMS Messages\0")
            .record(3, &sms(0, "5551234", b"Hello"))
            .record(0, &sms(0, "0000000", b"Ignored"))
            .build();
        write_archive(&input, 3, "Databases/3.dat", &database);

        assert_eq!(convert(&input, &output, &ConvertOptions::default()).unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), EXPECTED_XML);
    }

    #[test]
    fn archive_uid_zero_falls_back_to_name() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("backup.bbb");
        let output = dir.path().join("backup.xml");
        let database = ContainerBuilder::new(1)
            .database(b"Memos\0")
            .database(b"SMS Messages\0")
            .record(0, b"memo")
            .record(1, &sms(0, "5551234", b"Hello"))
            .build();
        write_archive(&input, 0, "Databases/0.dat", &database);

        assert_eq!(convert(&input, &output, &ConvertOptions::default()).unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), EXPECTED_XML);
    }

    #[rstest]
    #[case(None, None, Selector::Name(b"SMS Messages\0".to_vec()))]
    #[case(Some(0), None, Selector::Name(b"SMS Messages\0".to_vec()))]
    #[case(Some(0), Some(0), Selector::Name(b"SMS Messages\0".to_vec()))]
    #[case(Some(4), None, Selector::Id(4))]
    #[case(None, Some(3), Selector::Id(3))]
    #[case(Some(0), Some(3), Selector::Id(3))]
    #[case(Some(4), Some(3), Selector::Id(4))]
    fn zero_id_is_unset(#[case] database_id: Option<u32>, #[case] uid: Option<u32>, #[case] expected: Selector) {
        let options = ConvertOptions { database_id, ..ConvertOptions::default() };
        assert_eq!(options.container_selector(uid), expected);
    }

    #[test]
    fn convert_wide_text_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("device.ipd");
        let output = dir.path().join("device.xml");
        let bytes = ContainerBuilder::new(1)
            .database(b"SMS Messages\0")
            .record(0, &sms_encoded(0, "5551234", 2, &[0x00, 0x3C, 0x00, 0xE9, 0x04, 0x1F]))
            .build();
        std::fs::write(&input, bytes).unwrap();
        assert_eq!(convert(&input, &output, &ConvertOptions::default()).unwrap(), 1);
        let xml = std::fs::read_to_string(&output).unwrap();
        assert!(xml.contains("body=\"&lt;&#233;\u{41F}\""), "{xml}");
        assert!(xml.contains("<smses count=\"1\">"));
    }

    #[test]
    fn empty_result_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("device.ipd");
        let output = dir.path().join("device.xml");
        let bytes = ContainerBuilder::new(1).database(b"SMS Messages\0").record(1, b"other").build();
        std::fs::write(&input, bytes).unwrap();
        assert_eq!(convert(&input, &output, &ConvertOptions::default()).unwrap(), 0);
        assert!(!output.exists());
    }

    #[test]
    fn cancelled_before_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("device.ipd");
        let output = dir.path().join("device.xml");
        std::fs::write(&input, device()).unwrap();
        let cancel = Arc::new(AtomicBool::new(true));
        let options = ConvertOptions { progress: Progress::new().with_cancel(cancel), ..ConvertOptions::default() };
        let err = convert(&input, &output, &options).unwrap_err();
        assert_eq!(*err, ErrorKind::Cancelled);
        assert!(!output.exists());
    }

    #[test]
    fn missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert(dir.path().join("absent.ipd"), dir.path().join("out.xml"), &ConvertOptions::default())
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
    }

    #[test]
    fn inspect_counts_records() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("device.ipd");
        std::fs::write(&input, device()).unwrap();
        let inventory = inspect(&input, &ConvertOptions::default()).unwrap();
        assert_eq!(inventory.header, Header { version: 2, databases: 2 });
        assert_eq!(
            inventory.databases,
            vec![
                DatabaseSummary { index: 0, name: "Address Book".into(), records: 2 },
                DatabaseSummary { index: 1, name: "SMS Messages".into(), records: 2 },
            ]
        );
    }
}
