pub(crate) mod scope;
