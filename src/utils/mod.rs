mod maths_utils;

pub(crate) use maths_utils::solve_linear_system;
