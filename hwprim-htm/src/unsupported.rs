use crate::BeginCode;
use lazy_static::lazy_static;
use std::time::Instant;

lazy_static! {
    static ref EPOCH: Instant = Instant::now();
}

#[inline(never)]
#[cold]
fn unsupported() -> ! {
    panic!("target CPU does not support hardware transactional memory")
}

#[inline]
pub(crate) unsafe fn begin() -> BeginCode {
    unsupported()
}

#[inline]
pub(crate) unsafe fn end() {
    unsupported()
}

#[inline]
pub(crate) unsafe fn abort() -> ! {
    unsupported()
}

#[inline]
pub(crate) unsafe fn test() -> bool {
    false
}

#[inline]
pub(crate) const fn htm_supported() -> bool {
    false
}

#[inline]
pub(crate) fn timestamp() -> u64 {
    EPOCH.elapsed().as_nanos() as u64
}
