//! Messages exchanged between ranks.
//!
//! A delegated task travels as one [`Packet::Task`] holding the dimension,
//! product index, recursion level and both flattened operands. The reply is
//! one [`Packet::Result`] with the flattened (n/2)×(n/2) product.
//! [`Packet::Terminate`] is the zero-size sentinel that stops a worker.
//!
//! All integers on the wire are `i32`; packets are encoded with `bincode`.

use serde::{Deserialize, Serialize};

use crate::error::{protocol_error, Result};
use crate::matrix::Matrix;
use crate::strassen::PRODUCTS;

/// One message on the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Packet {
    Task(Task),
    Result(TaskResult),
    Terminate,
}

/// A self-contained unit of work: compute product `product` of the node
/// whose full operands are `a` and `b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub size: i32,
    pub product: i32,
    pub level: i32,
    pub a: Vec<i32>,
    pub b: Vec<i32>,
}

/// The flattened product sent back to the delegating rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub size: i32,
    pub data: Vec<i32>,
}

/// A decoded task, ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOperands {
    pub a: Matrix,
    pub b: Matrix,
    pub product: usize,
    pub level: usize,
}

fn to_wire(value: usize, what: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| protocol_error(format!("{} {} does not fit in i32", what, value)))
}

fn from_wire(value: i32, what: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| protocol_error(format!("negative {} {}", what, value)))
}

impl Task {
    /// Packs full operands `a` and `b` with the product index and level.
    pub fn new(a: &Matrix, b: &Matrix, product: usize, level: usize) -> Result<Self> {
        Ok(Task {
            size: to_wire(a.size(), "size")?,
            product: to_wire(product, "product index")?,
            level: to_wire(level, "level")?,
            a: a.flatten(),
            b: b.flatten(),
        })
    }

    /// Checks shape and ranges without touching the payload.
    pub fn validate(&self) -> Result<()> {
        let n = from_wire(self.size, "size")?;
        if n < 2 || !n.is_power_of_two() {
            return Err(protocol_error(format!(
                "task size {} is not a power of two >= 2",
                n
            )));
        }
        let product = from_wire(self.product, "product index")?;
        if product >= PRODUCTS {
            return Err(protocol_error(format!(
                "product index {} out of range 0..{}",
                product, PRODUCTS
            )));
        }
        from_wire(self.level, "level")?;
        if self.a.len() != n * n || self.b.len() != n * n {
            return Err(protocol_error(format!(
                "operand payloads hold {} and {} values, size {} needs {}",
                self.a.len(),
                self.b.len(),
                n,
                n * n
            )));
        }
        Ok(())
    }

    /// Validates and unflattens the operands.
    pub fn into_operands(self) -> Result<TaskOperands> {
        self.validate()?;
        let n = from_wire(self.size, "size")?;
        Ok(TaskOperands {
            product: from_wire(self.product, "product index")?,
            level: from_wire(self.level, "level")?,
            a: Matrix::unflatten(self.a, n)?,
            b: Matrix::unflatten(self.b, n)?,
        })
    }
}

impl TaskResult {
    pub fn from_matrix(m: &Matrix) -> Result<Self> {
        Ok(TaskResult {
            size: to_wire(m.size(), "size")?,
            data: m.flatten(),
        })
    }

    /// Unflattens the result, checking it has the dimension the caller waits for.
    pub fn into_matrix(self, expected: usize) -> Result<Matrix> {
        let n = from_wire(self.size, "size")?;
        if n != expected {
            return Err(protocol_error(format!(
                "result is {}x{}, expected {}x{}",
                n, n, expected, expected
            )));
        }
        Matrix::unflatten(self.data, n).map_err(|e| protocol_error(e.to_string()))
    }
}

/// Encodes a packet into bytes.
pub fn encode(packet: &Packet) -> Result<Vec<u8>> {
    Ok(bincode::serialize(packet)?)
}

/// Decodes bytes into a packet, validating task packets.
pub fn decode(bytes: &[u8]) -> Result<Packet> {
    let packet: Packet = bincode::deserialize(bytes)?;
    if let Packet::Task(task) = &packet {
        task.validate()?;
    }
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrassenError;

    fn sample_task() -> Task {
        Task::new(&Matrix::random(4, 1), &Matrix::random(4, 2), 3, 1).unwrap()
    }

    #[test]
    fn test_task_carries_full_operands() {
        let a = Matrix::random(8, 5);
        let b = Matrix::random(8, 6);
        let task = Task::new(&a, &b, 6, 2).unwrap();
        assert_eq!(task.size, 8);
        assert_eq!(task.product, 6);
        assert_eq!(task.level, 2);
        assert_eq!(task.a.len(), 64);

        let ops = task.into_operands().unwrap();
        assert_eq!(ops.a, a);
        assert_eq!(ops.b, b);
        assert_eq!((ops.product, ops.level), (6, 2));
    }

    #[test]
    fn test_packets_survive_encoding() {
        let packets = [
            Packet::Task(sample_task()),
            Packet::Result(TaskResult::from_matrix(&Matrix::random(2, 9)).unwrap()),
            Packet::Terminate,
        ];
        for packet in packets {
            let bytes = encode(&packet).unwrap();
            assert_eq!(decode(&bytes).unwrap(), packet);
        }
    }

    #[test]
    fn test_decode_rejects_bad_product_index() {
        let mut task = sample_task();
        task.product = 7;
        let bytes = encode(&Packet::Task(task)).unwrap();
        assert!(matches!(
            decode(&bytes),
            Err(StrassenError::ProtocolError { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_short_payload() {
        let mut task = sample_task();
        task.b.pop();
        let bytes = encode(&Packet::Task(task)).unwrap();
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(&[9, 9, 9]),
            Err(StrassenError::ProtocolError { .. })
        ));
    }

    #[test]
    fn test_result_size_checked() {
        let result = TaskResult::from_matrix(&Matrix::zeros(4)).unwrap();
        assert!(result.clone().into_matrix(2).is_err());
        assert_eq!(result.into_matrix(4).unwrap(), Matrix::zeros(4));
    }
}
