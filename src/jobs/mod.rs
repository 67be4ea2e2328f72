pub mod blacklist_sweeper;
