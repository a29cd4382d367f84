//! File drop-off feature: upload a file, share the retrieval code.
//!
//! Records live in an in-memory registry for the lifetime of the process;
//! blobs live in the configured upload directory. Files expire seven days
//! after upload and are removed by the background expiry sweeper.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/upload` | Upload a file, receive a retrieval code |
//! | GET | `/api/file/{code}` | File metadata |
//! | GET | `/api/download/{code}` | Download as attachment |
//! | GET | `/api/view/{code}` | Inline preview |
//! | GET | `/api/recent` | Ten most recent uploads |
//! | GET | `/api/stats` | Live file count |
//! | POST | `/api/maintenance/sweep` | Run the expiry sweep now |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;
pub mod workers;

pub use routes::routes;
pub use services::{CodeGenerator, FileService, Registry};
pub use stores::InMemoryRecordStore;
pub use workers::ExpirySweeper;
