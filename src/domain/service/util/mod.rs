pub mod service_command;
