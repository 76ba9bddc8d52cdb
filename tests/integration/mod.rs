mod basic_integration;
mod aggregator_workflow;
mod server_protocol;
