//! Buffer circular de magnitudes recentes (baseline por média móvel)

use std::collections::VecDeque;
use crate::error::{SignalError, SignalResult};

/// Capacidade padrão (10 amostras ≈ 200 ms a 50 Hz)
pub const DEFAULT_BUFFER_SIZE: usize = 10;

/// Capacidade máxima aceita na configuração
pub const MAX_BUFFER_SIZE: usize = 1000;

/// Soma recalculada do zero a cada N pushes para conter deriva de ponto flutuante
const RESYNC_INTERVAL: u32 = 4096;

/// FIFO de capacidade fixa com soma corrente.
///
/// `len() <= capacity()` sempre; a amostra mais antiga é descartada quando
/// uma nova chega com o buffer cheio. `push` e `mean` são O(1).
#[derive(Debug, Clone)]
pub struct RollingBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
    sum: f64,
    pushes_since_resync: u32,
}

impl RollingBuffer {
    /// Cria buffer com a capacidade dada (1..=1000)
    pub fn new(capacity: usize) -> SignalResult<Self> {
        if capacity == 0 || capacity > MAX_BUFFER_SIZE {
            return Err(SignalError::InvalidBufferSize(capacity));
        }

        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
            pushes_since_resync: 0,
        })
    }

    /// Insere valor; retorna o valor despejado, se houver
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };

        self.samples.push_back(value);
        self.sum += value - evicted.unwrap_or(0.0);

        self.pushes_since_resync += 1;
        if self.pushes_since_resync >= RESYNC_INTERVAL {
            self.sum = self.samples.iter().sum();
            self.pushes_since_resync = 0;
        }

        evicted
    }

    /// Média dos valores presentes (None se vazio)
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.sum / self.samples.len() as f64)
        }
    }

    /// Valor mais recente
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Itera do mais antigo ao mais recente
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }

    /// Esvazia o buffer (fim de sessão)
    pub fn clear(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
        self.pushes_since_resync = 0;
    }
}

impl Default for RollingBuffer {
    fn default() -> Self {
        Self {
            samples: VecDeque::with_capacity(DEFAULT_BUFFER_SIZE),
            capacity: DEFAULT_BUFFER_SIZE,
            sum: 0.0,
            pushes_since_resync: 0,
        }
    }
}
