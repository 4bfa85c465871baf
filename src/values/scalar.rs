//! Fixed-size scalar values (integers, floats, bool)

use std::marker::PhantomData;
use std::mem::size_of;

use crate::error::Result;
use crate::medium::Medium;
use crate::store::{Persistent, PersistentStore, RecordId, ValueHandle};

use super::write_through;

/// A plain value with a fixed little-endian encoding
pub trait Scalar: Copy {
    /// Encoded size in bytes
    const SIZE: u16;

    fn encode(self, out: &mut [u8]);

    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const SIZE: u16 = size_of::<$ty>() as u16;

                fn encode(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                fn decode(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Scalar for bool {
    const SIZE: u16 = 1;

    fn encode(self, out: &mut [u8]) {
        out[0] = self as u8;
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// A persistent scalar of type `T`
#[derive(Debug)]
pub struct PersistentScalar<T: Scalar> {
    handle: ValueHandle,
    _marker: PhantomData<T>,
}

impl<T: Scalar> PersistentScalar<T> {
    /// Create an unstored value with an initial value
    pub fn new(id: &str, init: T) -> Result<Self> {
        let mut handle = ValueHandle::new(RecordId::user(id)?, T::SIZE);
        init.encode(handle.bytes_mut());
        Ok(Self {
            handle,
            _marker: PhantomData,
        })
    }

    pub fn get(&self) -> T {
        T::decode(self.handle.bytes())
    }

    /// Set the value, writing it to the store if it changed
    pub fn set<M: Medium>(&mut self, store: &mut PersistentStore<M>, value: T) -> Result<()> {
        let mut encoded = vec![0u8; T::SIZE as usize];
        value.encode(&mut encoded);
        // Byte comparison so NaN payloads don't cause rewrites
        if encoded.as_slice() == self.handle.bytes() {
            return Ok(());
        }
        self.handle.bytes_mut().copy_from_slice(&encoded);
        write_through(store, self)
    }
}

impl<T: Scalar> Persistent for PersistentScalar<T> {
    fn handle(&self) -> &ValueHandle {
        &self.handle
    }

    fn handle_mut(&mut self) -> &mut ValueHandle {
        &mut self.handle
    }
}

pub type PersistentBool = PersistentScalar<bool>;
pub type PersistentI8 = PersistentScalar<i8>;
pub type PersistentU8 = PersistentScalar<u8>;
pub type PersistentI16 = PersistentScalar<i16>;
pub type PersistentU16 = PersistentScalar<u16>;
pub type PersistentI32 = PersistentScalar<i32>;
pub type PersistentU32 = PersistentScalar<u32>;
pub type PersistentI64 = PersistentScalar<i64>;
pub type PersistentU64 = PersistentScalar<u64>;
pub type PersistentF32 = PersistentScalar<f32>;
pub type PersistentF64 = PersistentScalar<f64>;
