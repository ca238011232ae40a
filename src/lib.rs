// Crate entry point. Re-export modules so tests and the binary can import them easily.
//
// Responsibilities
// - Only declare and expose modules. No business logic here.
//
// How it is used
// - src/shell/main.rs and the tests under tests/ reach everything through this crate root.

pub mod config;

pub mod core {
    pub mod object_record;
    pub mod ports;
    pub mod watermark;
}

pub mod application {
    pub mod errors;
    pub mod poller {
        pub mod runner;
        pub mod startup;
    }
}

pub mod adapters {
    pub mod in_memory {
        pub mod in_memory_object_store;
        pub mod in_memory_sync_tool;
    }
    pub mod juicefs {
        pub mod juicefs_sync_tool;
    }
    pub mod s3 {
        pub mod s3_object_store;
    }
}

pub mod shell;
