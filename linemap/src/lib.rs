//! # linemap - Source Line to Address Mapper
//!
//! linemap reads the DWARF line-number program of an executable and answers
//! the question the program encodes only in one direction: which machine
//! addresses were generated for a given source line. It can print annotated
//! listings of source files, the addresses of a single line, or dump the
//! whole mapping as JSON.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Executable (.debug_line)                     │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ gimli line programs
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         linemap                                 │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │  Debuginfo   │──▶│    Index     │──▶│   Resolver   │         │
//! │  │  (decoder)   │   │ (file→line)  │   │ (dir suffix) │         │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘         │
//! │                                               │                 │
//! │                                               ▼                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │   Display    │◀──│    Query     │◀──│    Source    │         │
//! │  │  (listing)   │   │   Engine     │   │   Reader     │         │
//! │  └──────────────┘   └──────┬───────┘   └──────────────┘         │
//! │                            │                                    │
//! │                            ▼                                    │
//! │                     ┌──────────────┐   ┌──────────────┐         │
//! │                     │    Export    │   │ Symbolizer   │         │
//! │                     │ (index.json) │   │  (reverse)   │         │
//! │                     └──────────────┘   └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`debuginfo`]: Run each compilation unit's line program and record
//!   every instruction with the row it produced
//! - [`index`]: Fold decoded units into `file → line → [(opcode, address)]`,
//!   relocated by a base address, optionally across worker threads
//! - [`resolver`]: Pick the indexed file a user path refers to, comparing
//!   trailing directory components when basenames collide
//! - [`query`]: Listings, per-line address lookups, directory walks and the
//!   structural dump
//! - [`symbolization`]: Address to source location via `addr2line`
//! - [`export`]: JSON serialization of the dump
//! - [`display`]: Column formatting and colors for terminal output
//! - [`cli`]: Command-line argument parsing
//! - [`preflight`]: Checks run on the binary before decoding
//! - [`domain`]: Shared types and error enums
//!
//! ## Typical Usage
//!
//! ```bash
//! # Annotated listing of one file, with line program opcodes
//! linemap -b ./app -f src/main.c --dwarf
//!
//! # Addresses of line 42 in a position-independent executable
//! linemap -b ./app -a 0x555555554000 -f src/main.c -l 42
//!
//! # Whole index as JSON
//! linemap -b ./app -j > index.json
//! ```

pub mod cli;
pub mod debuginfo;
pub mod display;
pub mod domain;
pub mod export;
pub mod index;
pub mod preflight;
pub mod query;
pub mod resolver;
pub mod symbolization;
