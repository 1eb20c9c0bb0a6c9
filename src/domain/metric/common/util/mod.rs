pub mod metric_sampling_step;
