//! An [AudioSource] fed through a channel.
//!
//! Capture callbacks hand over whatever chunk size the device chose. The
//! receiving end re-frames those chunks into the fixed block length the
//! detector was configured for.
use crossbeam_channel::{Receiver, Sender};

use super::AudioSource;
use crate::error::{Result, TunerError};
use crate::pcm::PcmSample;

/// Receives sample chunks of any length and reads them back as fixed blocks.
pub struct ChannelSource<S> {
    receiver: Receiver<Vec<S>>,
    pending: Vec<S>,
    cursor: usize,
}

impl<S: PcmSample> ChannelSource<S> {
    pub fn new(receiver: Receiver<Vec<S>>) -> Self {
        ChannelSource {
            receiver,
            pending: Vec::new(),
            cursor: 0,
        }
    }
}

/// A bounded channel with room for `capacity` chunks. A producer that must not
/// block, such as an audio callback, should use `try_send` and drop chunks when
/// the channel is full.
pub fn bounded<S: PcmSample>(capacity: usize) -> (Sender<Vec<S>>, ChannelSource<S>) {
    let (sender, receiver) = crossbeam_channel::bounded(capacity);
    (sender, ChannelSource::new(receiver))
}

impl<S: PcmSample> AudioSource for ChannelSource<S> {
    type Sample = S;

    /// Blocks until `block` is full. Once every sender is gone the stream has
    /// ended; a partially filled block is discarded.
    fn read(&mut self, block: &mut [S]) -> Result<()> {
        let mut filled = 0;
        while filled < block.len() {
            if self.cursor == self.pending.len() {
                self.pending = self.receiver.recv().map_err(|_| TunerError::EndOfStream)?;
                self.cursor = 0;
                continue;
            }
            let count = (block.len() - filled).min(self.pending.len() - self.cursor);
            block[filled..filled + count]
                .copy_from_slice(&self.pending[self.cursor..self.cursor + count]);
            filled += count;
            self.cursor += count;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reframes_uneven_chunks() {
        let (sender, mut source) = bounded::<i16>(8);
        sender.send(vec![1, 2, 3]).unwrap();
        sender.send(vec![]).unwrap();
        sender.send(vec![4, 5, 6, 7, 8]).unwrap();
        sender.send(vec![9]).unwrap();

        let mut block = [0i16; 4];
        source.read(&mut block).unwrap();
        assert_eq!(block, [1, 2, 3, 4]);
        source.read(&mut block).unwrap();
        assert_eq!(block, [5, 6, 7, 8]);

        drop(sender);
        assert!(matches!(
            source.read(&mut block),
            Err(TunerError::EndOfStream)
        ));
    }

    #[test]
    fn blocks_until_the_producer_catches_up() {
        let (sender, mut source) = bounded::<f32>(1);
        let producer = std::thread::spawn(move || {
            for chunk in 0..4 {
                sender.send(vec![chunk as f32; 3]).unwrap();
            }
        });

        let mut block = [0.0f32; 6];
        source.read(&mut block).unwrap();
        assert_eq!(block, [0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        source.read(&mut block).unwrap();
        assert_eq!(block, [2.0, 2.0, 2.0, 3.0, 3.0, 3.0]);
        producer.join().unwrap();
    }
}
