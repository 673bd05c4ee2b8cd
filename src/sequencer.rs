//! Chunked submission of command and data streams.
//!
//! Streams longer than the transport's chunk limit are cut into consecutive
//! transfers. A failed transfer stops the stream; nothing is resent.

use crate::Error;
use crate::interface::Interface;

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
/// Send a command byte stream, at most `chunk_limit` bytes per transfer.
pub async fn send_commands<DI: Interface>(
    interface: &mut DI,
    bytes: &[u8],
) -> Result<(), Error<DI::Error>> {
    let limit = interface.chunk_limit().max(1);
    for chunk in bytes.chunks(limit) {
        interface.write_command(chunk).await?;
    }
    Ok(())
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
/// Send display RAM bytes, at most `chunk_limit` bytes per transfer.
pub async fn send_data<DI: Interface>(
    interface: &mut DI,
    bytes: &[u8],
) -> Result<(), Error<DI::Error>> {
    let limit = interface.chunk_limit().max(1);
    for chunk in bytes.chunks(limit) {
        interface.write_data(chunk).await?;
    }
    Ok(())
}

#[cfg(all(test, feature = "async"))]
mod tests {
    use super::*;

    use std::vec::Vec;

    #[derive(Debug, PartialEq)]
    enum Transfer {
        Command(Vec<u8>),
        Data(Vec<u8>),
    }

    struct Recorder {
        limit: usize,
        transfers: Vec<Transfer>,
        fail_on: Option<usize>,
    }

    impl Recorder {
        fn new(limit: usize) -> Self {
            Self {
                limit,
                transfers: Vec::new(),
                fail_on: None,
            }
        }

        fn check(&self) -> Result<(), Error<()>> {
            match self.fail_on {
                Some(n) if n == self.transfers.len() => Err(Error::Comm(())),
                _ => Ok(()),
            }
        }
    }

    impl Interface for Recorder {
        type Error = ();

        fn chunk_limit(&self) -> usize {
            self.limit
        }

        async fn write_command(&mut self, bytes: &[u8]) -> Result<(), Error<()>> {
            self.check()?;
            self.transfers.push(Transfer::Command(bytes.to_vec()));
            Ok(())
        }

        async fn write_data(&mut self, bytes: &[u8]) -> Result<(), Error<()>> {
            self.check()?;
            self.transfers.push(Transfer::Data(bytes.to_vec()));
            Ok(())
        }
    }

    fn concat(transfers: &[Transfer]) -> Vec<u8> {
        transfers
            .iter()
            .flat_map(|t| match t {
                Transfer::Command(b) | Transfer::Data(b) => b.iter().copied(),
            })
            .collect()
    }

    #[tokio::test]
    async fn command_stream_splits_into_ceil_chunks() {
        let list: Vec<u8> = (0..70).collect();
        for limit in [1, 7, 31, 32, 69, 70, 128] {
            let mut rec = Recorder::new(limit);
            send_commands(&mut rec, &list).await.unwrap();

            assert_eq!(rec.transfers.len(), list.len().div_ceil(limit), "limit {limit}");
            assert!(
                rec.transfers
                    .iter()
                    .all(|t| matches!(t, Transfer::Command(b) if b.len() <= limit))
            );
            assert_eq!(concat(&rec.transfers), list);
        }
    }

    #[tokio::test]
    async fn data_stream_uses_data_transfers() {
        let mut rec = Recorder::new(4);
        send_data(&mut rec, &[1, 2, 3, 4, 5]).await.unwrap();
        assert_eq!(
            rec.transfers,
            [
                Transfer::Data(std::vec![1, 2, 3, 4]),
                Transfer::Data(std::vec![5]),
            ]
        );
    }

    #[tokio::test]
    async fn empty_stream_sends_nothing() {
        let mut rec = Recorder::new(4);
        send_commands(&mut rec, &[]).await.unwrap();
        assert!(rec.transfers.is_empty());
    }

    #[tokio::test]
    async fn failed_chunk_stops_the_stream() {
        let mut rec = Recorder::new(2);
        rec.fail_on = Some(1);
        let result = send_commands(&mut rec, &[1, 2, 3, 4, 5]).await;
        assert!(matches!(result, Err(Error::Comm(()))));
        assert_eq!(rec.transfers, [Transfer::Command(std::vec![1, 2])]);
    }
}
