/*
    Bounds on the searches and simulations, passed explicitly into every
    algorithm that could otherwise run forever
*/

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Limits {
    // Iterations of the LL(1) stack simulation
    pub max_steps: usize,
    // Distinct states the BFS solvers may explore
    pub max_states: usize,
    // Longest derivation the derivation BFS looks for
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_steps: 100,
            max_states: 2000,
            max_depth: 24,
        }
    }
}
