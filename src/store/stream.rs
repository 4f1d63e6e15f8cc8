//! Lazy streaming of a collection
//!
//! A producer thread walks the collection directory and deserializes one
//! record at a time into a bounded channel. The producer blocks whenever
//! the channel is full, so it never runs more than `stream_capacity`
//! records ahead of the consumer.
//!
//! The first per-file failure stops the producer. That error goes to a
//! separate one-shot slot, and the record channel then closes. A consumer
//! tells "exhausted" apart from "stopped on error" with
//! [`RecordStream::take_error`] or [`RecordStream::finish`].

use std::fs;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread::{self, JoinHandle};

use futures_util::Stream;
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};

use super::engine::{decode_record, Store};
use super::enumerate::{existing_collection_dir, is_record_entry};
use super::errors::{StoreError, StoreResult};
use super::paths::validate_name;
use crate::observability::Logger;

/// Single-pass sequence of deserialized records.
///
/// Consume it either as a blocking [`Iterator`] (outside an async runtime)
/// or as an async [`Stream`]. With `StreamExt` in scope, combinators shared
/// with `Iterator` (`next`, `map`, ...) need the trait spelled out.
#[derive(Debug)]
pub struct RecordStream<T> {
    records: mpsc::Receiver<T>,
    error: oneshot::Receiver<StoreError>,
    producer: Option<JoinHandle<()>>,
}

impl<T> Unpin for RecordStream<T> {}

impl<T> RecordStream<T> {
    /// Next record, waiting asynchronously for the producer.
    pub async fn recv(&mut self) -> Option<T> {
        self.records.recv().await
    }

    /// Terminal error of the producer, if it stopped on one.
    ///
    /// Meaningful once the stream is exhausted; reported at most once.
    pub fn take_error(&mut self) -> Option<StoreError> {
        self.error.try_recv().ok()
    }

    /// Abandon the remaining records, wait for the producer to stop, and
    /// return its terminal error if there was one.
    ///
    /// Blocks the calling thread until the producer exits.
    pub fn finish(mut self) -> StoreResult<()> {
        self.records.close();
        while self.records.try_recv().is_ok() {}

        if let Some(handle) = self.producer.take() {
            handle
                .join()
                .map_err(|_| StoreError::Internal("stream producer panicked".into()))?;
        }

        match self.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<T> Iterator for RecordStream<T> {
    type Item = T;

    /// Panics if called from within an async runtime; use the `Stream` impl there.
    fn next(&mut self) -> Option<T> {
        self.records.blocking_recv()
    }
}

impl<T> Stream for RecordStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.records.poll_recv(cx)
    }
}

impl Store {
    /// Stream every record of `collection`, deserialized as `T`.
    ///
    /// The collection must exist when this is called; later failures are
    /// reported through the stream's error slot. No lock is taken.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty or unsafe collection name
    /// - `NotFound` if the collection directory does not exist
    /// - `Io` if the producer thread cannot be spawned
    pub fn stream_all<T>(&self, collection: &str) -> StoreResult<RecordStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        validate_name("collection", collection)?;
        let dir = existing_collection_dir(self.root(), collection)?;

        let (record_tx, record_rx) = mpsc::channel(self.config().stream_capacity);
        let (error_tx, error_rx) = oneshot::channel();
        let collection = collection.to_string();

        let producer = thread::Builder::new()
            .name(format!("folio-stream-{}", collection))
            .spawn(move || produce(dir, collection, record_tx, error_tx))
            .map_err(|e| StoreError::io("failed to spawn stream producer", e))?;

        Ok(RecordStream {
            records: record_rx,
            error: error_rx,
            producer: Some(producer),
        })
    }
}

fn produce<T>(
    dir: PathBuf,
    collection: String,
    records: mpsc::Sender<T>,
    error: oneshot::Sender<StoreError>,
) where
    T: DeserializeOwned,
{
    if let Err(e) = send_records(&dir, &collection, &records) {
        let message = e.to_string();
        Logger::warn(
            "STREAM_ABORTED",
            &[
                ("code", e.code()),
                ("collection", collection.as_str()),
                ("error", message.as_str()),
            ],
        );
        let _ = error.send(e);
    }
    // The error slot is filled before the consumer can observe the close
    drop(records);
}

/// Returns `Ok` when the directory is exhausted or the consumer went away.
fn send_records<T>(
    dir: &Path,
    collection: &str,
    records: &mpsc::Sender<T>,
) -> StoreResult<()>
where
    T: DeserializeOwned,
{
    let entries = fs::read_dir(dir)
        .map_err(|e| StoreError::from_io_at(format!("collection {}", collection), e))?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            StoreError::io(format!("failed to enumerate collection {}", collection), e)
        })?;
        if !is_record_entry(&entry, collection)? {
            continue;
        }

        let record: T = decode_record(&entry.path())?;
        if records.blocking_send(record).is_err() {
            return Ok(());
        }
    }
    Ok(())
}
