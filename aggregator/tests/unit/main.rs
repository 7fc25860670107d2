mod test_builder;
mod test_sources;
