use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};

use crate::decoder::AnswerDecoder;

/// Answer stream events, already decoded and stripped of the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerEvent {
    /// The first body chunk arrived, whether or not it decoded to text yet.
    /// Sent once, before any `Delta`.
    Started,
    /// Newly decoded answer text; never empty.
    Delta(String),
    /// The server answered without a readable body. Terminal.
    NoBody,
    /// The sentinel was seen or the body ended. Terminal.
    Done,
    /// Opening the request or reading a chunk failed. Terminal.
    Error(String),
}

pub type AnswerWorker = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Receiving half of one answer stream.
///
/// Dropping it signals the worker to stop reading.
pub struct AnswerEventStream {
    events: mpsc::UnboundedReceiver<AnswerEvent>,
    cancel_tx: Option<oneshot::Sender<()>>,
}

/// Stops a running answer worker from outside the read loop.
#[derive(Debug)]
pub struct StreamCanceller {
    cancel_tx: oneshot::Sender<()>,
}

impl StreamCanceller {
    /// Returns false when the worker already finished.
    pub fn cancel(self) -> bool {
        self.cancel_tx.send(()).is_ok()
    }
}

pub struct AnswerStreamHandle {
    pub stream: AnswerEventStream,
    pub worker: AnswerWorker,
}

impl AnswerEventStream {
    pub(crate) fn new(
        events: mpsc::UnboundedReceiver<AnswerEvent>,
        cancel_tx: oneshot::Sender<()>,
    ) -> Self {
        Self {
            events,
            cancel_tx: Some(cancel_tx),
        }
    }

    pub async fn recv(&mut self) -> Option<AnswerEvent> {
        self.events.recv().await
    }

    /// Hands the cancellation signal to another owner so the stream can keep
    /// being read while someone else decides when to stop it.
    pub fn take_canceller(&mut self) -> Option<StreamCanceller> {
        self.cancel_tx
            .take()
            .map(|cancel_tx| StreamCanceller { cancel_tx })
    }
}

impl Drop for AnswerEventStream {
    fn drop(&mut self) {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(());
        }
    }
}

pub(crate) fn make_event_stream() -> (
    mpsc::UnboundedSender<AnswerEvent>,
    AnswerEventStream,
    oneshot::Receiver<()>,
) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    (
        event_tx,
        AnswerEventStream::new(event_rx, cancel_tx),
        cancel_rx,
    )
}

/// Wires a body source into an answer stream.
///
/// `open` resolves to the response body, or `None` when the response has no
/// readable body. The returned worker must be polled inside a tokio runtime; it
/// decodes chunks in arrival order and stops at the sentinel, at the end of
/// the body, on the first error, or when cancelled.
pub fn answer_stream<F, S, E>(open: F) -> AnswerStreamHandle
where
    F: Future<Output = Result<Option<S>, E>> + Send + 'static,
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let (event_tx, stream, cancel_rx) = make_event_stream();
    let worker: AnswerWorker = Box::pin(run_answer_worker(open, event_tx, cancel_rx));
    AnswerStreamHandle { stream, worker }
}

async fn run_answer_worker<F, S, E>(
    open: F,
    event_tx: mpsc::UnboundedSender<AnswerEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) where
    F: Future<Output = Result<Option<S>, E>> + Send + 'static,
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let opened = tokio::select! {
        _ = &mut cancel_rx => {
            tracing::debug!("answer stream cancelled before the response arrived");
            return;
        }
        opened = open => opened,
    };

    let body = match opened {
        Ok(Some(body)) => body,
        Ok(None) => {
            tracing::warn!("stream response carried no readable body");
            let _ = event_tx.send(AnswerEvent::NoBody);
            return;
        }
        Err(error) => {
            tracing::error!(error = %error, "failed to open answer stream");
            let _ = event_tx.send(AnswerEvent::Error(error.to_string()));
            return;
        }
    };

    let mut body = Box::pin(body);
    let mut decoder = AnswerDecoder::new();
    let mut chunk_count = 0usize;

    loop {
        tokio::select! {
            _ = &mut cancel_rx => {
                tracing::debug!(chunk_count, "answer stream cancelled");
                return;
            }
            next_chunk = body.next() => {
                match next_chunk {
                    Some(Ok(chunk)) => {
                        chunk_count += 1;
                        if chunk_count == 1 && event_tx.send(AnswerEvent::Started).is_err() {
                            return;
                        }
                        let decoded = decoder.push(&chunk);
                        if !decoded.text.is_empty()
                            && event_tx.send(AnswerEvent::Delta(decoded.text)).is_err()
                        {
                            return;
                        }
                        if decoded.sentinel {
                            tracing::debug!(chunk_count, "sentinel received; stop reading");
                            break;
                        }
                    }
                    Some(Err(error)) => {
                        tracing::warn!(chunk_count, error = %error, "answer stream failed mid-body");
                        let _ = event_tx.send(AnswerEvent::Error(error.to_string()));
                        return;
                    }
                    None => {
                        let tail = decoder.finish();
                        if !tail.is_empty() && event_tx.send(AnswerEvent::Delta(tail)).is_err() {
                            return;
                        }
                        tracing::debug!(chunk_count, "answer body ended without sentinel");
                        break;
                    }
                }
            }
        }
    }

    let _ = event_tx.send(AnswerEvent::Done);
}

#[cfg(test)]
mod tests {
    use std::io;

    use futures::stream;

    use super::*;

    type ChunkStream = stream::Iter<std::vec::IntoIter<Result<Bytes, io::Error>>>;

    fn chunks(parts: &[&str]) -> Vec<Result<Bytes, io::Error>> {
        parts
            .iter()
            .map(|part| Ok(Bytes::copy_from_slice(part.as_bytes())))
            .collect()
    }

    async fn collect(mut handle: AnswerStreamHandle) -> Vec<AnswerEvent> {
        tokio::spawn(handle.worker);
        let mut events = Vec::new();
        while let Some(event) = handle.stream.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn deltas_arrive_in_order_and_stop_at_sentinel() {
        let body = chunks(&["Hel", "lo wor", "ld", "[DONE]", "after"]);
        let handle = answer_stream(async move { Ok::<_, io::Error>(Some(stream::iter(body))) });

        assert_eq!(collect(handle).await, vec![
            AnswerEvent::Started,
            AnswerEvent::Delta("Hel".to_string()),
            AnswerEvent::Delta("lo wor".to_string()),
            AnswerEvent::Delta("ld".to_string()),
            AnswerEvent::Done,
        ]);
    }

    #[tokio::test]
    async fn missing_body_emits_single_terminal_event() {
        let handle = answer_stream(async { Ok::<Option<ChunkStream>, io::Error>(None) });
        assert_eq!(collect(handle).await, vec![AnswerEvent::NoBody]);
    }

    #[tokio::test]
    async fn open_failure_is_reported_as_error() {
        let handle = answer_stream(async {
            Err::<Option<ChunkStream>, _>(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))
        });
        assert_eq!(collect(handle).await, vec![AnswerEvent::Error(
            "connection refused".to_string()
        )]);
    }

    #[tokio::test]
    async fn chunk_failure_ends_stream_after_partial_text() {
        let mut body = chunks(&["Selon l'article"]);
        body.push(Err(io::Error::new(io::ErrorKind::BrokenPipe, "reset by peer")));
        body.extend(chunks(&["never read"]));
        let handle = answer_stream(async move { Ok::<_, io::Error>(Some(stream::iter(body))) });

        assert_eq!(collect(handle).await, vec![
            AnswerEvent::Started,
            AnswerEvent::Delta("Selon l'article".to_string()),
            AnswerEvent::Error("reset by peer".to_string()),
        ]);
    }

    #[tokio::test]
    async fn body_without_sentinel_flushes_held_text_then_completes() {
        let body = chunks(&["voir [D"]);
        let handle = answer_stream(async move { Ok::<_, io::Error>(Some(stream::iter(body))) });

        assert_eq!(collect(handle).await, vec![
            AnswerEvent::Started,
            AnswerEvent::Delta("voir ".to_string()),
            AnswerEvent::Delta("[D".to_string()),
            AnswerEvent::Done,
        ]);
    }

    #[tokio::test]
    async fn first_chunk_is_announced_even_when_held_back() {
        let body = chunks(&["[", "DONE]"]);
        let handle = answer_stream(async move { Ok::<_, io::Error>(Some(stream::iter(body))) });

        assert_eq!(collect(handle).await, vec![
            AnswerEvent::Started,
            AnswerEvent::Done,
        ]);
    }

    #[tokio::test]
    async fn cancelling_stops_worker_without_terminal_event() {
        let body = stream::pending::<Result<Bytes, io::Error>>();
        let mut handle = answer_stream(async move { Ok::<_, io::Error>(Some(body)) });
        let canceller = handle.stream.take_canceller();
        let worker = tokio::spawn(handle.worker);

        assert!(canceller.is_some_and(StreamCanceller::cancel));
        worker.await.expect("worker task should not panic");
        assert_eq!(handle.stream.recv().await, None);
    }
}
