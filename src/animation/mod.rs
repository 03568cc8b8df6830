pub(crate) mod keyframes;
