//! Mutating workflows run inside the actor's loops.
//!
//! - [`create`]: chain key and EOTS key bootstrap, proof-of-possession,
//!   persistence of the `CREATED` record
//! - [`register`]: registration transaction and the `REGISTERED` write

pub(crate) mod create;
pub(crate) mod register;
