//! File loaders.

mod transition_table;

pub use transition_table::{
    TransitionEntry, TransitionTableFile, load_transition_table, parse_transition_table,
    save_transition_table, transition_table_to_yaml,
};
