mod guidance;
mod problem;
mod propagation;
mod scenario;
