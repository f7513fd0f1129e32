use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use audec::auto_decompress;
use log::{debug, trace};
use serde::Deserialize;
use thiserror::Error;

use crate::event::Event;

/// Reader for a YAML event file
///
/// Each YAML document in the file is one [Event]. Compressed files
/// are decompressed on the fly. Events without an explicit id are
/// numbered consecutively, starting from `first_id`.
pub struct EventReader {
    path: PathBuf,
    documents: serde_yaml::Deserializer<'static>,
    next_id: usize,
}

impl EventReader {
    /// Open the event file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CreateError> {
        Self::open_with_first_id(path, 0)
    }

    pub fn open_with_first_id<P: AsRef<Path>>(
        path: P,
        first_id: usize,
    ) -> Result<Self, CreateError> {
        let path = path.as_ref().to_owned();
        debug!("Reading events from {path:?}");
        let file = File::open(&path).map_err(|err| CreateError::IoError {
            path: path.clone(),
            source: err,
        })?;
        let source = auto_decompress(BufReader::new(file));
        Ok(Self {
            path,
            documents: serde_yaml::Deserializer::from_reader(source),
            next_id: first_id,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Id given to the next event without an explicit id
    ///
    /// This is one past the id of the last event read.
    pub fn next_id(&self) -> usize {
        self.next_id
    }
}

/// YAML document as read from the file
#[derive(Deserialize)]
struct EventRecord {
    #[serde(default)]
    id: Option<usize>,
    #[serde(flatten)]
    event: Event,
}

impl Iterator for EventReader {
    type Item = Result<Event, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let document = self.documents.next()?;
        let record = match EventRecord::deserialize(document) {
            Ok(record) => record,
            Err(err) => {
                return Some(Err(ReadError {
                    path: self.path.clone(),
                    source: err,
                }))
            }
        };
        let mut event = record.event;
        event.id = record.id.unwrap_or(self.next_id);
        self.next_id = event.id + 1;
        trace!("Read event {}", event.id);
        Some(Ok(event))
    }
}

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("Failed to open {path:?}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
#[error("Failed to read event from {path:?}: {source}")]
pub struct ReadError {
    pub path: PathBuf,
    pub source: serde_yaml::Error,
}

/// Reader chaining the events from several readers
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CombinedReader<R> {
    readers: Vec<R>,
    current: usize,
}

impl<R> CombinedReader<R> {
    pub fn new(readers: Vec<R>) -> Self {
        Self {
            readers,
            current: 0,
        }
    }
}

impl<R: Iterator> Iterator for CombinedReader<R> {
    type Item = <R as Iterator>::Item;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(reader) = self.readers.get_mut(self.current) {
            let next = reader.next();
            if next.is_some() {
                return next;
            }
            self.current += 1;
        }
        None
    }
}

impl CombinedReader<EventReader> {
    /// Construct a new reader reading from the files with the given names
    pub fn from_files<I, P>(files: I) -> Result<Self, CreateError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let readers: Result<_, _> = files.into_iter().map(EventReader::open).collect();
        Ok(Self::new(readers?))
    }
}
