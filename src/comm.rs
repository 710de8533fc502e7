//! Point-to-point channels between ranks.
//!
//! [`Communicator`] is the only thing the engine and the worker loop know
//! about the transport. Implementors move opaque byte buffers; packet
//! encoding sits in the provided methods on top.
//!
//! Two transports ship with the crate:
//!
//! | Transport | Ranks | Feature |
//! |-----------|-------|---------|
//! | [`LocalComm`] | threads of one process, `crossbeam-channel` inboxes | always |
//! | [`MpiComm`] | one OS process per rank, MPI world | `mpi` |

use std::cell::RefCell;
use std::collections::VecDeque;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::{communication_error, validation_error, Result};
use crate::wire::{self, Packet};

/// A blocking, ordered, point-to-point channel to every other rank.
///
/// Messages from one source arrive in the order they were sent. Receives
/// block until a matching message exists; there is no timeout.
pub trait Communicator {
    fn rank(&self) -> usize;

    /// Number of ranks in the communicator.
    fn size(&self) -> usize;

    /// Sends one buffer to `dest`.
    fn send_bytes(&self, dest: usize, bytes: Vec<u8>) -> Result<()>;

    /// Receives the next buffer from any source, returning the source rank.
    fn receive_bytes_any(&self) -> Result<(usize, Vec<u8>)>;

    /// Receives the next buffer sent by `source`. Buffers from other
    /// sources stay queued for later receives.
    fn receive_bytes_from(&self, source: usize) -> Result<Vec<u8>>;

    fn send(&self, dest: usize, packet: &Packet) -> Result<()> {
        self.send_bytes(dest, wire::encode(packet)?)
    }

    fn receive_any(&self) -> Result<(usize, Packet)> {
        let (source, bytes) = self.receive_bytes_any()?;
        Ok((source, wire::decode(&bytes)?))
    }

    fn receive_from(&self, source: usize) -> Result<Packet> {
        wire::decode(&self.receive_bytes_from(source)?)
    }
}

struct Envelope {
    source: usize,
    bytes: Vec<u8>,
}

/// A set of in-process ranks wired to each other.
pub struct LocalUniverse;

impl LocalUniverse {
    /// Creates `size` connected endpoints; endpoint `i` has rank `i`.
    ///
    /// Each endpoint is meant to be moved onto its own thread.
    pub fn endpoints(size: usize) -> Result<Vec<LocalComm>> {
        if size == 0 {
            return Err(validation_error("a universe needs at least one rank"));
        }

        let (senders, receivers): (Vec<Sender<Envelope>>, Vec<Receiver<Envelope>>) =
            (0..size).map(|_| unbounded()).unzip();

        Ok(receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| LocalComm {
                rank,
                inbox,
                peers: senders.clone(),
                held: RefCell::new(VecDeque::new()),
            })
            .collect())
    }
}

/// One rank's endpoint in a [`LocalUniverse`].
pub struct LocalComm {
    rank: usize,
    inbox: Receiver<Envelope>,
    peers: Vec<Sender<Envelope>>,
    // arrived from a source nobody asked for yet, in arrival order
    held: RefCell<VecDeque<Envelope>>,
}

impl LocalComm {
    fn next_envelope(&self) -> Result<Envelope> {
        self.inbox
            .recv()
            .map_err(|_| communication_error(self.rank, "inbox closed"))
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send_bytes(&self, dest: usize, bytes: Vec<u8>) -> Result<()> {
        let peer = self
            .peers
            .get(dest)
            .ok_or_else(|| communication_error(dest, "no such rank"))?;
        peer.send(Envelope {
            source: self.rank,
            bytes,
        })
        .map_err(|_| communication_error(dest, "rank has shut down"))
    }

    fn receive_bytes_any(&self) -> Result<(usize, Vec<u8>)> {
        let held = self.held.borrow_mut().pop_front();
        let envelope = match held {
            Some(envelope) => envelope,
            None => self.next_envelope()?,
        };
        Ok((envelope.source, envelope.bytes))
    }

    fn receive_bytes_from(&self, source: usize) -> Result<Vec<u8>> {
        if source >= self.size() {
            return Err(communication_error(source, "no such rank"));
        }

        {
            let mut held = self.held.borrow_mut();
            if let Some(pos) = held.iter().position(|e| e.source == source) {
                if let Some(envelope) = held.remove(pos) {
                    return Ok(envelope.bytes);
                }
            }
        }

        loop {
            let envelope = self.next_envelope()?;
            if envelope.source == source {
                return Ok(envelope.bytes);
            }
            self.held.borrow_mut().push_back(envelope);
        }
    }
}

#[cfg(feature = "mpi")]
pub use self::mpi_backend::MpiComm;

#[cfg(feature = "mpi")]
mod mpi_backend {
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, Destination, Source};
    use mpi::Tag;

    use super::Communicator;
    use crate::error::{communication_error, Result};

    /// Every packet travels under one tag; the packet itself says what it is.
    const PACKET_TAG: Tag = 100;

    /// One rank of an MPI world.
    pub struct MpiComm {
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        pub fn new(world: SimpleCommunicator) -> Self {
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            MpiComm { world, rank, size }
        }

        fn check(&self, rank: usize) -> Result<i32> {
            if rank >= self.size {
                return Err(communication_error(rank, "no such rank"));
            }
            Ok(rank as i32)
        }
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn send_bytes(&self, dest: usize, bytes: Vec<u8>) -> Result<()> {
            let dest = self.check(dest)?;
            self.world
                .process_at_rank(dest)
                .send_with_tag(&bytes[..], PACKET_TAG);
            Ok(())
        }

        fn receive_bytes_any(&self) -> Result<(usize, Vec<u8>)> {
            let (bytes, status) = self.world.any_process().receive_vec_with_tag::<u8>(PACKET_TAG);
            Ok((status.source_rank() as usize, bytes))
        }

        fn receive_bytes_from(&self, source: usize) -> Result<Vec<u8>> {
            let source = self.check(source)?;
            let (bytes, _) = self
                .world
                .process_at_rank(source)
                .receive_vec_with_tag::<u8>(PACKET_TAG);
            Ok(bytes)
        }
    }
}
