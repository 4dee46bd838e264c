//! Domain entities for voicemap.
//!
//! This module contains the state the client owns and the rules that mutate
//! it.  None of it performs I/O: collaborators such as the map renderer or
//! durable storage are reached through the traits in [`crate::ports`] and are
//! passed in by the caller.
//!
//! | Module          | Owns                                              |
//! |-----------------|---------------------------------------------------|
//! | `command`       | The structured command received from recognition  |
//! | `marker`        | Point markers currently placed on the map         |
//! | `layer`         | The single attached base layer                    |
//! | `history`       | Bounded, persisted log of navigations             |
//! | `connectivity`  | The time-gated online/offline badge               |

pub mod command;
pub mod connectivity;
pub mod geo;
pub mod history;
pub mod layer;
pub mod marker;
