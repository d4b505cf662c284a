mod input_props;
mod merge_props;
