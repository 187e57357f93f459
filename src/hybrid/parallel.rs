//! Worker-pool block encoding for the hybrid codec.
//!
//! The main thread feeds block jobs into a bounded channel; workers
//! compress independently and send indexed results back, which are
//! reassembled in block order. Per-block output is identical to the
//! single-threaded path, so thread count never changes the frame bytes.

use std::ops::Range;

use crossbeam::channel::{bounded, unbounded};

use crate::error::Result;
use crate::CompressionConfig;

use super::classify::Primitive;
use super::compress_block;

/// An encoded block ready for framing: primitive used, decoded length,
/// payload bytes.
pub(super) type EncodedBlock = (Primitive, usize, Vec<u8>);

pub(super) fn encode_blocks(
    data: &[u8],
    ranges: &[Range<usize>],
    num_threads: usize,
    config: &CompressionConfig,
) -> Result<Vec<EncodedBlock>> {
    let (job_tx, job_rx) = bounded::<(usize, &[u8])>(num_threads * 4);
    let (result_tx, result_rx) = unbounded::<(usize, Result<(Primitive, Vec<u8>)>)>();

    let mut slots: Vec<Option<EncodedBlock>> = Vec::with_capacity(ranges.len());
    slots.resize_with(ranges.len(), || None);

    std::thread::scope(|scope| -> Result<()> {
        for _ in 0..num_threads {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let config = config.clone();

            scope.spawn(move || {
                while let Ok((index, block)) = job_rx.recv() {
                    let result = compress_block(block, &config);
                    if result_tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(job_rx);
        drop(result_tx);

        for (index, range) in ranges.iter().enumerate() {
            if job_tx.send((index, &data[range.clone()])).is_err() {
                break;
            }
        }
        drop(job_tx);

        let mut first_error = None;
        for _ in 0..ranges.len() {
            let Ok((index, result)) = result_rx.recv() else {
                break;
            };
            match result {
                Ok((primitive, payload)) => {
                    slots[index] = Some((primitive, ranges[index].len(), payload));
                }
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    })?;

    // Every block either produced a result or the loop above errored.
    Ok(slots.into_iter().map(|slot| slot.expect("all blocks encoded")).collect())
}
