//! Branch hints usable on stable.

#[doc(hidden)]
#[inline(always)]
pub fn _unlikely(b: bool) -> bool {
    nudge::unlikely(b)
}

#[doc(hidden)]
#[inline(always)]
pub fn _likely(b: bool) -> bool {
    nudge::likely(b)
}

macro_rules! unlikely {
    ($e:expr) => {
        $crate::internal::optim::_unlikely($e)
    };
}

macro_rules! likely {
    ($e:expr) => {{
        $crate::internal::optim::_likely($e)
    }};
}
