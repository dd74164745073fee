//! Display surface the dispatcher reports to

/// Where status text, process output and the container list are shown
pub trait DisplaySurface {
    /// Replace the status line
    fn display_message(&mut self, message: &str);

    /// Append process standard output
    fn display_output(&mut self, output: &str);

    /// Append error text (process standard error or a failure report)
    fn display_error(&mut self, error: &str);

    /// Replace the list of known containers
    fn set_containers(&mut self, names: Vec<String>);
}
