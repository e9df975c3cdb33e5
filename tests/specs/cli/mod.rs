mod check;
mod configure;
mod help;
