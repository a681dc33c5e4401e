//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements               | Connects to                 |
//! |------------|--------------------------|-----------------------------|
//! | `log_sink` | EventSink                | `log` facade                |
//! | `store`    | StoragePort              | in-memory key-value map     |
//! |            | ProfileStore             | JSON blob under `csg_data`  |
//! | `time`     | TimePort                 | host monotonic + wall clock |
//! | `sim`      | Haptic, Location,        | simulated handset devices   |
//! |            | Capture, Audio, TimePort |                             |

pub mod log_sink;
pub mod sim;
pub mod store;
pub mod time;
